mod common;

use booth_pdf::{
    BoothGroup, ErrorKind, FontPaths, Fonts, Layout, Record, booth_file_name,
    generate_booth_pdfs_with, render_booth_pdf, render_row, render_title,
};

fn is_dark(img: &image::RgbImage, x: u32, y: u32) -> bool {
    img.get_pixel(x, y).0[0] < 128
}

fn group(key: &str, count: usize) -> BoothGroup {
    BoothGroup {
        key: key.to_string(),
        records: (0..count)
            .map(|i| Record {
                row: i,
                cells: common::voter_row(key, "a", &i.to_string(), &format!("V{i}")),
            })
            .collect(),
    }
}

#[test]
fn three_records_make_two_booth_documents() {
    let Some(fonts) = common::test_font_paths() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("roll.xlsx");
    common::write_voter_roll(
        &source,
        &[
            common::voter_row("12", "b", "1", "Asha"),
            common::voter_row("7", "a", "2", "Vijay"),
            common::voter_row("12", "a", "1", "Meena"),
        ],
    );
    let out = dir.path().join("out");

    let reports = generate_booth_pdfs_with(&source, &out, "17", &Layout::default(), &fonts).unwrap();

    let names: Vec<String> = reports
        .iter()
        .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Booth_12.pdf", "Booth_7.pdf"]);
    assert_eq!(reports[0].rows, 2);
    assert_eq!(reports[1].rows, 1);

    for report in &reports {
        assert_eq!(report.pages, 1);
        let bytes = std::fs::read(&report.path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(common::pdf_page_count(&bytes), Some(1));
        // title + header + one image per data row
        assert_eq!(
            common::count_occurrences(&bytes, b"/Subtype /Image"),
            2 + report.rows
        );
    }
    let entries = std::fs::read_dir(&out).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn overflowing_booth_repeats_header_on_new_page() {
    let Some(paths) = common::test_font_paths() else {
        return;
    };
    let layout = Layout::default();
    let fonts = Fonts::load(&paths, &layout).unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let exact = render_booth_pdf(&group("3", 29), "17", &layout, &fonts, scratch.path()).unwrap();
    assert_eq!(exact.pages, 1);
    assert_eq!(common::pdf_page_count(&exact.bytes), Some(1));

    let spill = render_booth_pdf(&group("3", 30), "17", &layout, &fonts, scratch.path()).unwrap();
    assert_eq!(spill.pages, 2);
    assert_eq!(common::pdf_page_count(&spill.bytes), Some(2));
    // The header image is shared: it shows up once per page as a resource entry.
    assert_eq!(common::count_occurrences(&spill.bytes, b"/Im2 "), 2);
}

#[test]
fn rerendering_is_byte_identical() {
    let Some(paths) = common::test_font_paths() else {
        return;
    };
    let layout = Layout::default();
    let fonts = Fonts::load(&paths, &layout).unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let booth = group("21", 35);

    let first = render_booth_pdf(&booth, "5", &layout, &fonts, scratch.path()).unwrap();
    let second = render_booth_pdf(&booth, "5", &layout, &fonts, scratch.path()).unwrap();
    assert_eq!(first.pages, second.pages);
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn every_page_uses_the_fixed_page_size() {
    let Some(paths) = common::test_font_paths() else {
        return;
    };
    let layout = Layout::default();
    let fonts = Fonts::load(&paths, &layout).unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let doc = render_booth_pdf(&group("9", 70), "5", &layout, &fonts, scratch.path()).unwrap();
    assert_eq!(doc.pages, 3);
    assert_eq!(common::count_occurrences(&doc.bytes, b"/MediaBox"), 3);
}

#[test]
fn row_bitmap_matches_table_geometry() {
    let Some(paths) = common::test_font_paths() else {
        return;
    };
    let layout = Layout::default();
    let fonts = Fonts::load(&paths, &layout).unwrap();
    let blank = vec![""; 9];

    let normal = render_row(&blank, &fonts.data, false, &layout).unwrap();
    let bold = render_row(&blank, &fonts.header, true, &layout).unwrap();
    for img in [&normal, &bold] {
        assert_eq!(img.width(), layout.table_width() * 2);
        assert_eq!(img.height(), 50);
    }

    // left border: 2px normal, 4px bold
    assert!(is_dark(&normal, 1, 25));
    assert!(!is_dark(&normal, 3, 25));
    assert!(is_dark(&bold, 3, 25));
    assert!(!is_dark(&bold, 5, 25));
    // top border and the clipped bottom border
    assert!(is_dark(&normal, 20, 0));
    assert!(is_dark(&normal, 20, 49));
    assert!(!is_dark(&normal, 20, 25));
}

#[test]
fn long_cell_text_runs_into_the_next_column() {
    let Some(paths) = common::test_font_paths() else {
        return;
    };
    let layout = Layout::default();
    let fonts = Fonts::load(&paths, &layout).unwrap();
    let mut values = vec![""; 9];
    values[0] = "WWWWWWWWWWWWWWWWWWWWWWWW";

    let img = render_row(&values, &fonts.data, false, &layout).unwrap();
    // second column spans pixels 76..142; skip its borders
    let inked = (80..138).any(|x| (10..40).any(|y| is_dark(&img, x, y)));
    assert!(inked, "text should overflow its 38pt column");
}

#[test]
fn title_block_spans_the_page() {
    let Some(paths) = common::test_font_paths() else {
        return;
    };
    let layout = Layout::default();
    let fonts = Fonts::load(&paths, &layout).unwrap();

    let img = render_title("Municipal Election", "Ward (17) 17", &fonts.title, &layout).unwrap();
    assert_eq!(img.width(), 1190);
    assert_eq!(img.height(), 160);
    // centered text leaves both edges blank
    assert!((0..160).all(|y| !is_dark(&img, 0, y) && !is_dark(&img, 1189, y)));
    assert!((0..1190).any(|x| (10..40).any(|y| is_dark(&img, x, y))));
}

#[test]
fn missing_font_is_a_font_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("roll.xlsx");
    common::write_voter_roll(&source, &[common::voter_row("1", "a", "1", "Asha")]);
    let fonts = FontPaths {
        regular: dir.path().join("missing-regular.ttf"),
        semibold: dir.path().join("missing-semibold.ttf"),
    };

    let err = generate_booth_pdfs_with(&source, &dir.path().join("out"), "1", &Layout::default(), &fonts)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FontLoad);
}

#[test]
fn bad_source_fails_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let fonts = FontPaths {
        regular: dir.path().join("r.ttf"),
        semibold: dir.path().join("b.ttf"),
    };

    let err = generate_booth_pdfs_with(&dir.path().join("absent.xlsx"), &out, "1", &Layout::default(), &fonts)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataAccess);
    assert!(!out.exists());
}

#[test]
fn booth_keys_are_made_safe_for_file_names() {
    assert_eq!(booth_file_name("12"), "Booth_12.pdf");
    assert_eq!(booth_file_name("4/A"), "Booth_4_A.pdf");
    assert_eq!(booth_file_name(""), "Booth_.pdf");
}

#[test]
fn output_dir_that_is_a_file_is_an_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("roll.xlsx");
    common::write_voter_roll(&source, &[common::voter_row("1", "a", "1", "Asha")]);
    let blocker = dir.path().join("out");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let fonts = FontPaths {
        regular: dir.path().join("r.ttf"),
        semibold: dir.path().join("b.ttf"),
    };

    let err = generate_booth_pdfs_with(&source, &blocker, "1", &Layout::default(), &fonts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutputIo);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"not a directory");
}

#[test]
fn devanagari_text_renders_with_the_default_face() {
    let Some(regular) = booth_pdf::find_font_file(booth_pdf::REGULAR_FONT_FILE) else {
        println!("{} not found; skipping", booth_pdf::REGULAR_FONT_FILE);
        return;
    };
    let paths = FontPaths {
        semibold: booth_pdf::find_font_file(booth_pdf::SEMIBOLD_FONT_FILE)
            .unwrap_or_else(|| regular.clone()),
        regular,
    };
    let layout = Layout::default();
    let fonts = Fonts::load(&paths, &layout).unwrap();

    assert!(fonts.data.text_width("क्ष").unwrap() > 0.0);

    let mut values = vec![""; 9];
    values[2] = "क्षीरसागर";
    let img = render_row(&values, &fonts.data, false, &layout).unwrap();
    // third column starts at (38 + 33) * 2 px
    let inked = (150..260).any(|x| (8..42).any(|y| is_dark(&img, x, y)));
    assert!(inked);

    let (title, subtitle) = layout.title.lines("17");
    let banner = render_title(&title, &subtitle, &fonts.title, &layout).unwrap();
    assert_eq!(banner.width(), 1190);
    assert!((0..1190).any(|x| (10..40).any(|y| is_dark(&banner, x, y))));
}
