use lrc_editor::app_settings::EditorSettings;
use lrc_editor::playback::{HighlightChange, PlaybackState, disordered_indices};
use lrc_editor::{
    BilingualLayout, EditRejection, LineField, LyricEditor, LyricLine, MetadataKey, Timestamp,
    generate_lrc, parse_lrc,
};

const BILINGUAL: &str = "\
[ti:Night Song]
[ar:Someone]
[00:12.30]First line
[00:12.30]第一句
[00:15.80]Second line / 第二句
not a lyric [
[00:20.00]Third line";

fn ts(centis: u64) -> Option<Timestamp> {
    Some(Timestamp::from_centis(centis))
}

fn session() -> LyricEditor {
    let mut editor = LyricEditor::default();
    editor.load_text(BILINGUAL);
    editor
}

#[test]
fn parse_edit_and_save_as_single_line() {
    let mut editor = session();
    assert_eq!(editor.document().len(), 4);
    assert_eq!(editor.document().lines[3], LyricLine::new(None, "not a lyric [", ""));

    editor.delete_lines(&[3]).unwrap();
    editor.edit_metadata(MetadataKey::Album, "Album");
    editor
        .edit_field(2, LineField::Translated, "第三句")
        .unwrap();

    assert_eq!(
        editor.to_lrc(BilingualLayout::SingleLine),
        "[ti:Night Song]\n[ar:Someone]\n[al:Album]\n\
         [00:12.30]First line / 第一句\n\
         [00:15.80]Second line / 第二句\n\
         [00:20.00]Third line / 第三句"
    );
}

#[test]
fn saved_text_parses_back_to_same_document() {
    let editor = session();
    for layout in [BilingualLayout::Separated, BilingualLayout::SingleLine] {
        let text = generate_lrc(editor.document(), layout);
        assert_eq!(&parse_lrc(&text), editor.document(), "{layout}");
    }
}

#[test]
fn rejected_delete_leaves_history_untouched() {
    let mut editor = session();
    let before = editor.document().clone();
    assert_eq!(editor.delete_lines(&[]), Err(EditRejection::EmptySelection));
    assert_eq!(editor.document(), &before);
    assert!(editor.history().is_empty());
    assert!(!editor.action_states().undo);
}

#[test]
fn merge_hello_world_then_undo() {
    let mut editor = LyricEditor::default();
    editor.load_text("[00:01.00]Hello\n[00:02.00]World");
    assert_eq!(editor.merge_lines(&[0, 1]), Ok(0));
    assert_eq!(
        editor.document().lines,
        vec![LyricLine::new(ts(100), "Hello World", "")]
    );

    editor.undo().unwrap();
    assert_eq!(editor.document().len(), 2);
    assert_eq!(editor.undo(), Err(EditRejection::NothingToUndo));
}

#[test]
fn history_is_bounded_and_linear() {
    let mut editor = LyricEditor::new(&EditorSettings {
        history_limit: 10,
        ..EditorSettings::default()
    });
    editor.load_text("[00:01.00]start");

    for i in 0..12 {
        editor
            .edit_field(0, LineField::Original, &format!("edit {i}"))
            .unwrap();
    }
    assert_eq!(editor.history().len(), 10);

    let mut undone = 0;
    while editor.undo().is_ok() {
        undone += 1;
    }
    assert_eq!(undone, 10);
    assert_eq!(editor.document().lines[0].original, "edit 1");

    editor.redo().unwrap();
    editor.redo().unwrap();
    editor.add_line(None).unwrap();
    assert!(!editor.can_redo());
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn tapping_timestamps_while_playing() {
    let mut editor = LyricEditor::default();
    editor.load_text("one\ntwo\nthree");
    editor.set_audio_loaded(true);
    editor.selection_mut().select(0, false);
    editor.set_playback_state(PlaybackState::Playing);

    for position in [1_000, 2_500, 4_000] {
        assert!(editor.action_states().mark_timestamp);
        editor.mark_timestamp(position).unwrap();
    }
    let stamps: Vec<_> = editor.document().lines.iter().map(|l| l.timestamp).collect();
    assert_eq!(stamps, vec![ts(100), ts(250), ts(400)]);
    assert_eq!(editor.selection().rows(), vec![2]);

    editor.selection_mut().clear();
    assert_eq!(
        editor.poll_playback(2_600),
        Some(HighlightChange {
            previous: None,
            current: Some(1)
        })
    );
    assert_eq!(editor.poll_playback(2_700), None);
    assert_eq!(editor.row_marks().highlighted, Some(1));

    assert_eq!(
        editor.set_playback_state(PlaybackState::Stopped),
        Some(HighlightChange {
            previous: Some(1),
            current: None
        })
    );
}

#[test]
fn out_of_order_edit_is_flagged_not_fixed() {
    let mut editor = session();
    editor
        .edit_field(0, LineField::Timestamp, "00:30.00")
        .unwrap();
    assert_eq!(editor.document().lines[0].timestamp, ts(3000));
    assert_eq!(
        disordered_indices(editor.document()).into_iter().collect::<Vec<_>>(),
        vec![1]
    );
    assert_eq!(editor.row_marks().out_of_order.len(), 1);
}

#[test]
fn split_then_undo_restores_line() {
    let mut editor = session();
    editor.selection_mut().select(1, false);
    assert_eq!(editor.split_selected(), Ok(1));
    assert_eq!(editor.document().lines[1], LyricLine::new(ts(1580), "Second", "第二句"));
    assert_eq!(editor.document().lines[2], LyricLine::new(None, "line", ""));

    editor.undo().unwrap();
    assert_eq!(
        editor.document().lines[1],
        LyricLine::new(ts(1580), "Second line", "第二句")
    );
}
