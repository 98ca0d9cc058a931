//! End-to-end integration tests for pdfpress.
//!
//! These tests exercise the full pipelines against real pdfium rendering,
//! so they are gated behind the `E2E_ENABLED` environment variable and skip
//! cleanly when no pdfium library is available (e.g. in CI).
//!
//! Test PDFs are generated on the fly with lopdf — a few blank-ish pages of
//! known geometry are all the pipelines care about.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfpress::{
    compress_with, extract_with, CancelToken, CompressConfig, ExtractConfig, JobOutcome,
    OutputBundle, PageArtifact, ProgressCallback, QualityPreset,
};
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set (pdfium must be installed).
macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Build a PDF whose pages have the given point geometries.
fn pdf_with_pages(pages: &[(f32, f32)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for &(w, h) in pages {
        // A filled rectangle so every page has some content to rasterise.
        let content = Content {
            operations: vec![
                Operation::new("re", vec![10.into(), 10.into(), 50.into(), 30.into()]),
                Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode test content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(w), Object::Real(h)],
            "Resources" => dictionary! {},
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("serialise test PDF");
    out
}

fn write_pdf(dir: &std::path::Path, name: &str, pages: &[(f32, f32)]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_with_pages(pages)).expect("write test PDF");
    path
}

fn as_f32(obj: &Object) -> f32 {
    match obj {
        Object::Integer(n) => *n as f32,
        Object::Real(r) => *r,
        other => panic!("not a number: {other:?}"),
    }
}

fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).expect("valid zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect()
}

/// Progress callback that records every percentage it sees.
struct Recording {
    percents: Mutex<Vec<u8>>,
    canceled: AtomicUsize,
}

impl Recording {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            percents: Mutex::new(Vec::new()),
            canceled: AtomicUsize::new(0),
        })
    }
}

impl ProgressCallback for Recording {
    fn on_page_complete(&self, _a: &PageArtifact, _p: usize, _t: usize, percent: u8) {
        self.percents.lock().unwrap().push(percent);
    }

    fn on_job_canceled(&self, processed: usize) {
        // +1 so "canceled after zero pages" is distinguishable from
        // "never canceled".
        self.canceled.store(processed + 1, Ordering::SeqCst);
    }
}

// ── Extractor ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn extract_single_page_is_a_direct_jpeg() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "solo.pdf", &[(612.0, 792.0)]);

    let outcome = pdfpress::extract(&[pdf], &ExtractConfig::default())
        .await
        .expect("extract should succeed");

    let JobOutcome::Completed { bundle, stats } = outcome else {
        panic!("expected completion");
    };
    assert_eq!(stats.total_pages, 1);
    assert_eq!(stats.processed_pages, 1);

    match bundle {
        OutputBundle::Single { name, mime, bytes } => {
            assert_eq!(name, "solo_001.jpg");
            assert_eq!(mime, "image/jpeg");
            assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");
        }
        OutputBundle::Zip { .. } => panic!("single page must not zip"),
    }
}

#[tokio::test]
async fn extract_multi_page_bundles_into_converted_zip() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "tri.pdf", &[(612.0, 792.0); 3]);

    let outcome = pdfpress::extract(&[pdf], &ExtractConfig::default())
        .await
        .expect("extract should succeed");

    let bundle = outcome.bundle().expect("completed").clone();
    let OutputBundle::Zip { name, bytes } = bundle else {
        panic!("multi-page output must be a zip");
    };
    assert_eq!(name, "converted.zip");
    assert_eq!(
        zip_entry_names(&bytes),
        vec!["tri_001.jpg", "tri_002.jpg", "tri_003.jpg"]
    );
}

#[tokio::test]
async fn extract_two_single_page_files_still_zip() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", &[(300.0, 300.0)]);
    let b = write_pdf(dir.path(), "b.pdf", &[(300.0, 300.0)]);

    let outcome = pdfpress::extract(&[a, b], &ExtractConfig::default())
        .await
        .expect("extract should succeed");

    let OutputBundle::Zip { bytes, .. } = outcome.bundle().unwrap().clone() else {
        panic!("two files must zip even with one page each");
    };
    assert_eq!(zip_entry_names(&bytes), vec!["a_001.jpg", "b_001.jpg"]);
}

#[tokio::test]
async fn progress_percent_is_monotonic_and_ends_at_100() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "steps.pdf", &[(200.0, 200.0); 4]);

    let recording = Recording::new();
    let outcome = extract_with(
        &[pdf],
        &ExtractConfig::default(),
        CancelToken::new(),
        recording.clone(),
    )
    .await
    .expect("extract should succeed");

    assert!(matches!(outcome, JobOutcome::Completed { .. }));
    let percents = recording.percents.lock().unwrap().clone();
    assert_eq!(percents.len(), 4);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
    assert_eq!(*percents.last().unwrap(), 100);
    assert!(percents[..3].iter().all(|&p| p < 100), "{percents:?}");
}

#[tokio::test]
async fn pre_set_cancel_token_produces_no_artifacts() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "halt.pdf", &[(200.0, 200.0); 2]);

    let cancel = CancelToken::new();
    cancel.cancel();
    let recording = Recording::new();

    let outcome = extract_with(&[pdf], &ExtractConfig::default(), cancel, recording.clone())
        .await
        .expect("cancellation is not an error");

    let JobOutcome::Canceled { processed_pages } = outcome else {
        panic!("expected cancellation");
    };
    assert_eq!(processed_pages, 0);
    assert_eq!(recording.canceled.load(Ordering::SeqCst), 1);
    assert!(recording.percents.lock().unwrap().is_empty());
}

// ── Compressor ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn compress_preserves_page_geometry_at_any_dpi() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let sizes = [(612.0f32, 792.0f32), (300.0, 400.0), (841.9, 595.3)];
    let pdf = write_pdf(dir.path(), "mixed.pdf", &sizes);

    let config = CompressConfig::builder()
        .preset(QualityPreset::Min)
        .build()
        .unwrap();
    let outcome = pdfpress::compress(&[pdf], &config)
        .await
        .expect("compress should succeed");

    let OutputBundle::Single { name, bytes, .. } = outcome.bundle().unwrap().clone() else {
        panic!("single file compresses to a direct PDF");
    };
    assert_eq!(name, "mixed_compressed.pdf");

    let doc = Document::load_mem(&bytes).expect("rebuilt PDF loads");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), sizes.len());

    for ((_, &page_id), (w, h)) in pages.iter().zip(sizes) {
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert!(
            (as_f32(&media_box[2]) - w).abs() < 0.5,
            "width drifted: {media_box:?}"
        );
        assert!(
            (as_f32(&media_box[3]) - h).abs() < 0.5,
            "height drifted: {media_box:?}"
        );
    }
}

#[tokio::test]
async fn compress_embeds_one_dctdecode_image_per_page() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "img.pdf", &[(400.0, 300.0)]);

    let outcome = pdfpress::compress(&[pdf], &CompressConfig::default())
        .await
        .expect("compress should succeed");

    let OutputBundle::Single { bytes, .. } = outcome.bundle().unwrap().clone() else {
        panic!("expected direct PDF");
    };
    let doc = Document::load_mem(&bytes).unwrap();
    let (_, &page_id) = doc.get_pages().iter().next().map(|(k, v)| (*k, v)).unwrap();
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let image_ref = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
    let stream = doc.get_object(image_ref).unwrap().as_stream().unwrap();

    assert_eq!(
        stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
        b"DCTDecode"
    );
    // pc preset renders at 2.0x: 400x300 pt → 800x600 px.
    assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 800);
    assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 600);
    assert_eq!(&stream.content[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn compress_multiple_files_bundles_into_zip() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let a = write_pdf(dir.path(), "first.pdf", &[(200.0, 200.0); 2]);
    let b = write_pdf(dir.path(), "second.pdf", &[(200.0, 200.0)]);

    let config = CompressConfig::builder()
        .inter_file_delay_ms(0)
        .build()
        .unwrap();
    let outcome = pdfpress::compress(&[a, b], &config)
        .await
        .expect("compress should succeed");

    let OutputBundle::Zip { name, bytes } = outcome.bundle().unwrap().clone() else {
        panic!("multi-file output must be a zip");
    };
    assert_eq!(name, "compressed_pdfs.zip");
    assert_eq!(
        zip_entry_names(&bytes),
        vec!["first_compressed.pdf", "second_compressed.pdf"]
    );

    // Each entry is itself a loadable PDF with the right page count.
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut first = Vec::new();
    archive
        .by_name("first_compressed.pdf")
        .unwrap()
        .read_to_end(&mut first)
        .unwrap();
    assert_eq!(Document::load_mem(&first).unwrap().get_pages().len(), 2);
}

#[tokio::test]
async fn counting_pass_total_matches_rendered_total() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let a = write_pdf(dir.path(), "x.pdf", &[(200.0, 200.0); 3]);
    let b = write_pdf(dir.path(), "y.pdf", &[(200.0, 200.0); 2]);

    let outcome = pdfpress::extract(&[a, b], &ExtractConfig::default())
        .await
        .expect("extract should succeed");

    let JobOutcome::Completed { stats, .. } = outcome else {
        panic!("expected completion");
    };
    assert_eq!(stats.total_pages, 5);
    assert_eq!(stats.processed_pages, 5);
    assert_eq!(stats.files, 2);
}

#[tokio::test]
async fn compress_canceled_midway_discards_output() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "quit.pdf", &[(200.0, 200.0); 3]);

    // Cancel as soon as the first page completes.
    struct CancelAfterFirst(CancelToken);
    impl ProgressCallback for CancelAfterFirst {
        fn on_page_complete(&self, _a: &PageArtifact, processed: usize, _t: usize, _pc: u8) {
            if processed == 1 {
                self.0.cancel();
            }
        }
    }

    let cancel = CancelToken::new();
    let progress = Arc::new(CancelAfterFirst(cancel.clone()));

    let outcome = compress_with(&[pdf], &CompressConfig::default(), cancel, progress)
        .await
        .expect("cancellation is not an error");

    let JobOutcome::Canceled { processed_pages } = outcome else {
        panic!("expected cancellation");
    };
    assert_eq!(processed_pages, 1);
}
