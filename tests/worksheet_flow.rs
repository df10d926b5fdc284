use badasseugi::gateway::{filter_candidates, parse_sentence_payload, pcm_to_wav};
use badasseugi::render::geometry::{DrawOp, PageSpec, page_ops};
use badasseugi::store::audio_cache::AudioStore;
use badasseugi::worksheet::layout::{
    LineBudgets, clamp_page, page_slice, sentences_per_page, total_pages,
};
use badasseugi::worksheet::{LayoutKind, SheetOptions, Worksheet};

fn filled_worksheet(count: usize) -> Worksheet {
    let mut sheet = Worksheet::new(SheetOptions::default());
    for i in 0..count {
        sheet.add(&format!("문장 {i}")).unwrap();
    }
    sheet
}

fn texts(ops: &[DrawOp]) -> Vec<String> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn editing_to_pagination_flow() {
    let mut sheet = filled_worksheet(23);
    let budgets = LineBudgets::default();

    // Default grid layout with one practice line: 7 sentences per page.
    let per = sentences_per_page(&sheet.options, &budgets);
    assert_eq!(per, 7);
    assert_eq!(total_pages(sheet.len(), per), 4);

    // Last page holds the remainder with continuous ordinals.
    let (start, slice) = page_slice(sheet.sentences(), 4, per);
    assert_eq!(start, 21);
    assert_eq!(slice.len(), 2);
    assert_eq!(slice[0], "문장 21");

    // Deleting down to one page forces the view back.
    for _ in 0..22 {
        sheet.remove(0).unwrap();
    }
    let total = total_pages(sheet.len(), per);
    assert_eq!(total, 1);
    assert_eq!(clamp_page(4, total), 1);

    // Layout switch changes capacity without touching the sentences.
    sheet.options.kind = LayoutKind::Underline;
    let per_underline = sentences_per_page(&sheet.options, &budgets);
    assert_eq!(per_underline, 5);
    assert_eq!(sheet.len(), 1);
}

#[test]
fn over_length_sentence_rejected_everywhere() {
    let mut sheet = filled_worksheet(2);
    let long = "가나다라마바사아자차카타"; // 12 display units

    assert!(sheet.add(long).is_err());
    assert!(sheet.edit(0, long).is_err());
    assert!(sheet.add_lines(&format!("짧은 문장\n{long}")).is_err());
    // All-or-nothing: the short line must not have been added either.
    assert_eq!(sheet.len(), 2);
}

#[test]
fn generation_payload_flows_into_worksheet() {
    let body = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{
                "text": "[\"학교에 가요\", \"가나다라마바사아자차카타\", \"바다가 보여요\"]"
            }] }
        }]
    })
    .to_string();

    let raw = parse_sentence_payload(&body).unwrap();
    let kept = filter_candidates(raw).unwrap();
    assert_eq!(kept.len(), 2);

    let mut sheet = filled_worksheet(3);
    sheet.replace_all(kept).unwrap();
    assert_eq!(sheet.sentences(), ["학교에 가요", "바다가 보여요"]);
}

#[test]
fn page_ops_ordinals_continue_across_pages() {
    let sheet = filled_worksheet(10);
    let budgets = LineBudgets::default();
    let per = sentences_per_page(&sheet.options, &budgets);
    let total = total_pages(sheet.len(), per);

    let (start, slice) = page_slice(sheet.sentences(), 2, per);
    let spec = PageSpec {
        sentences: slice,
        start_index: start,
        page_number: 2,
        total_pages: total,
        options: sheet.options,
        date_label: "2026. 8. 29.",
    };
    let ops = page_ops(&spec, &budgets);
    let texts = texts(&ops);

    assert!(texts.iter().any(|t| t == "받아쓰기 시험"));
    assert!(texts.iter().any(|t| t == "8."));
    assert!(texts.iter().any(|t| t == "10."));
    assert!(!texts.iter().any(|t| t == "7."));
    assert!(texts.iter().any(|t| t == "- 2 / 2 -"));
}

#[test]
fn synthesized_audio_round_trips_through_cache() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = AudioStore::with_base_dir(dir.path().to_path_buf()).unwrap();

    // 100ms of silence at the TTS sample rate.
    let pcm = vec![0u8; 4800];
    let wav = pcm_to_wav(&pcm).unwrap();

    let mut cache = store.load();
    store.put(&mut cache, "학교에 가요", &wav).unwrap();

    // A fresh process sees the persisted entry byte for byte.
    let reloaded = store.load();
    let cached = AudioStore::get(&reloaded, "학교에 가요").unwrap();
    assert_eq!(cached, wav);
    assert_eq!(&cached[0..4], b"RIFF");
}
