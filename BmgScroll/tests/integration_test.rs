use bmgscroll::prelude::*;
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::tempdir;

const PLAYER_NAME: &[u8] = &[0x05, 0x00, 0x00, 0x00, 0x00];
const BOX_BREAK: &[u8] = &[0x01, 0x00, 0x01, 0x00];

/// Message body pieces
enum Part<'a> {
    Text(&'a str),
    Escape(&'a [u8]),
}

fn body(parts: &[Part]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for part in parts {
        match part {
            Part::Text(text) => bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes)),
            Part::Escape(payload) => {
                bytes.extend_from_slice(&[0x00, 0x1A, payload.len() as u8 + 3]);
                bytes.extend_from_slice(payload);
            }
        }
    }
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

fn id_table(ids: &[&str]) -> Vec<u8> {
    let mut data = (ids.len() as u32).to_be_bytes().to_vec();
    data.extend_from_slice(&[0u8; 0x24]);
    let mut offset = 0u32;
    for (index, id) in ids.iter().enumerate() {
        data.extend_from_slice(&(index as u32).to_be_bytes());
        data.extend_from_slice(&offset.to_be_bytes());
        offset += id.len() as u32 + 1;
    }
    for id in ids {
        data.extend_from_slice(id.as_bytes());
        data.push(0);
    }
    data
}

/// Build `message.bmg` with 8-byte INF1 entries; `None` bodies get offset 0
fn content_archive(bodies: &[Option<Vec<u8>>]) -> Vec<u8> {
    let mut dat = vec![0u8; 8];
    let mut offsets = Vec::new();
    for body in bodies {
        match body {
            Some(body) => {
                offsets.push(dat.len() as u32);
                dat.extend_from_slice(body);
            }
            None => offsets.push(0),
        }
    }
    archive_with_offsets(&offsets, &dat)
}

fn archive_with_offsets(offsets: &[u32], dat: &[u8]) -> Vec<u8> {
    let entries = offsets.len() as u32 * 8;
    let size = (16 + entries).div_ceil(32) * 32;

    let mut data = vec![0u8; 0x20];
    data.extend_from_slice(b"INF1");
    data.extend_from_slice(&size.to_be_bytes());
    data.extend_from_slice(&(offsets.len() as u16).to_be_bytes());
    data.extend_from_slice(&8u16.to_be_bytes());
    data.extend_from_slice(&[0u8; 4]);
    for offset in offsets {
        data.extend_from_slice(&offset.to_be_bytes());
        data.extend_from_slice(&[0u8; 4]);
    }
    data.resize(data.len() + (size - 16 - entries) as usize, 0);
    data.extend_from_slice(b"DAT1");
    data.extend_from_slice(&(dat.len() as u32 + 8).to_be_bytes());
    data.extend_from_slice(dat);
    data
}

fn write_language(dir: &Path, ids: &[&str], bodies: &[Option<Vec<u8>>]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("messageid.tbl"), id_table(ids)).unwrap();
    std::fs::write(dir.join("message.bmg"), content_archive(bodies)).unwrap();
}

fn sample_language(dir: &Path) {
    write_language(
        dir,
        &[
            "System_PlayerName000",
            "System_PlayerName100",
            "Tutorial_Welcome",
            "Tutorial_Slow",
            "Unused",
            "Empty",
        ],
        &[
            Some(body(&[Part::Text("Mario")])),
            Some(body(&[Part::Text("Luigi")])),
            Some(body(&[
                Part::Text("Welcome, "),
                Part::Escape(PLAYER_NAME),
                Part::Text("!"),
                Part::Escape(BOX_BREAK),
                Part::Text("\nLet's go."),
            ])),
            Some(body(&[Part::Text("0123456789")])),
            None,
            Some(body(&[])),
        ],
    );
}

/// Route library logs through the test harness's captured output
fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn lookup() -> LookupContext {
    let mut ctx = LookupContext::with_default_languages();
    ctx.forced_slow.insert("Tutorial_Slow".to_string());
    ctx
}

#[test]
fn test_language_directory_round_trip() {
    init_logging();
    let temp = tempdir().unwrap();
    let dir = temp.path().join("usenglish");
    sample_language(&dir);

    let raw = read_language_dir(&dir).unwrap();
    assert_eq!(raw.len(), 6);
    assert!(raw[4].is_null());

    let records = process_language("usenglish", &raw, &lookup(), DecodeOptions::default()).unwrap();

    let welcome = &records["Tutorial_Welcome"];
    assert_eq!(welcome.text_display, "Welcome, <Player name>!\n\nLet's go.");
    // Box 1: "Welcome, Mario!" = 15 chars -> floor(14.5 / 0.4375) = 33
    // Box 2: "Let's go." = 9 chars, leading newline suppressed -> 20
    assert_eq!(
        welcome.boxes_display,
        "{luigi: 33 length, 15 chars, mario: 33 length, 15 chars}\n20 length, 9 chars"
    );
    // ceil(33 / 3) + (10 + ceil(10 / 3)) + 2 * 2
    assert_eq!(welcome.frames_display, "luigi: 29 + 2A\nmario: 29 + 2A");

    // Forced slow: 22 + 2
    assert_eq!(records["Tutorial_Slow"].frames_display, "24 + 1A");
    assert_eq!(records["Unused"].boxes_display, "<N/A>");
    assert_eq!(records["Empty"].text_display, "<Blank message>");
}

#[test]
fn test_out_of_order_archive_produces_no_output() {
    init_logging();
    let first = body(&[Part::Text("First")]);
    let second = body(&[Part::Text("Second")]);
    let mut dat = vec![0u8; 8];
    let first_offset = dat.len() as u32;
    dat.extend_from_slice(&first);
    let second_offset = dat.len() as u32;
    dat.extend_from_slice(&second);

    // The second message points back into the first one's body
    let temp = tempdir().unwrap();
    let dir = temp.path().join("usenglish");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("messageid.tbl"), id_table(&["A", "B"])).unwrap();
    std::fs::write(
        dir.join("message.bmg"),
        archive_with_offsets(&[second_offset, first_offset], &dat),
    )
    .unwrap();

    let err = process_language_dir("usenglish", &dir, &lookup(), DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::OutOfOrderMessage { index: 1, .. }));

    let result = process_languages(
        &[LanguageSource::new("usenglish", &dir)],
        &lookup(),
        DecodeOptions::default(),
        false,
        |_| {},
    );
    assert_eq!(result.success_count, 0);
    assert_eq!(result.fail_count, 1);
    assert!(matches!(
        result.outcomes[0].result,
        Err(Error::OutOfOrderMessage { index: 1, .. })
    ));
}

#[test]
fn test_batch_isolates_failing_language() {
    init_logging();
    let temp = tempdir().unwrap();
    let good = temp.path().join("usenglish");
    let broken = temp.path().join("jpjapanese");
    sample_language(&good);
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join("messageid.tbl"), id_table(&["A"])).unwrap();
    std::fs::write(broken.join("message.bmg"), b"not an archive").unwrap();

    let sources = [
        LanguageSource::new("usenglish", &good),
        LanguageSource::new("jpjapanese", &broken),
    ];
    let result = process_languages(&sources, &lookup(), DecodeOptions::default(), false, |_| {});

    assert_eq!(result.success_count, 1);
    assert_eq!(result.fail_count, 1);
    assert!(result.outcomes[0].result.is_ok());
    assert!(result.outcomes[1].result.is_err());
}

#[test]
fn test_parallel_and_sequential_agree() {
    init_logging();
    let temp = tempdir().unwrap();
    let english = temp.path().join("usenglish");
    let japanese = temp.path().join("jpjapanese");
    sample_language(&english);
    sample_language(&japanese);

    let sources = [
        LanguageSource::new("usenglish", &english),
        LanguageSource::new("jpjapanese", &japanese),
    ];
    let ctx = lookup();
    let sequential = process_languages(&sources, &ctx, DecodeOptions::default(), false, |_| {});
    let parallel = process_languages(&sources, &ctx, DecodeOptions::default(), true, |_| {});

    for (a, b) in sequential.outcomes.iter().zip(&parallel.outcomes) {
        assert_eq!(a.language, b.language);
        assert_eq!(a.result.as_ref().unwrap(), b.result.as_ref().unwrap());
    }
}

#[test]
fn test_records_serialize_to_json() {
    init_logging();
    let temp = tempdir().unwrap();
    let dir = temp.path().join("usenglish");
    sample_language(&dir);

    let records = process_language_dir("usenglish", &dir, &lookup(), DecodeOptions::default()).unwrap();
    let json = serde_json::to_value(&records).unwrap();

    assert_eq!(json["Tutorial_Slow"]["frames"]["base"], 24);
    assert_eq!(json["Tutorial_Slow"]["frames"]["forced_slow"], true);
    assert_eq!(json["Tutorial_Welcome"]["frames"]["base"]["mario"], 29);
    assert_eq!(json["Tutorial_Welcome"]["boxes"][1]["chars"], 9);
    assert!(json["Unused"]["frames"].is_null());
}
