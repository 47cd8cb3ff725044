//! # Render Tests
//!
//! Raster and file output of encoded symbols: scaling, rotation, the
//! MaxiCode plot through a caller-registered backend, and file writing.

use barforge::dispatch::FlatEncoder;
use barforge::error::Result;
use barforge::symbol::Pixels;
use barforge::{Format, OutputOptions, Raster, Registry, Segment, Symbol, Symbology, Warning};
use pretty_assertions::assert_eq;

fn qr(data: &str, scale: f32) -> Symbol {
    let mut s = Symbol::new();
    s.options.symbology = Symbology::QrCode.id();
    s.options.scale = scale;
    s.encode(data).unwrap();
    s
}

fn buffered(mut s: Symbol, rotate: i32) -> Raster {
    s.buffer(rotate).unwrap();
    s.raster().cloned().unwrap()
}

fn pixel(r: &Raster, x: usize, y: usize) -> [u8; 3] {
    r.rgb_at(x, y).unwrap()
}

// ============================================================================
// SCALING
// ============================================================================

#[test]
fn test_qr_scale_one() {
    let r = buffered(qr("12345", 1.0), 0);
    // Two pixels per module
    assert_eq!((r.width, r.height), (42, 42));
    // Top-left finder pattern corner is dark
    assert_eq!(pixel(&r, 0, 0), [0, 0, 0]);
    assert_eq!(pixel(&r, 1, 1), [0, 0, 0]);
    // Inside the finder's light ring
    assert_eq!(pixel(&r, 2, 2), [0xff, 0xff, 0xff]);
}

fn assert_scale_two_doubles(symbology: Symbology, data: &str) {
    let render = |scale: f32| {
        let mut s = Symbol::new();
        s.options.symbology = symbology.id();
        s.options.scale = scale;
        s.encode(data).unwrap();
        buffered(s, 0)
    };
    let small = render(1.0);
    let large = render(2.0);
    assert_eq!((large.width, large.height), (small.width * 2, small.height * 2), "{}", symbology);
    for y in 0..large.height {
        for x in 0..large.width {
            assert_eq!(pixel(&large, x, y), pixel(&small, x / 2, y / 2), "{} ({}, {})", symbology, x, y);
        }
    }
}

#[test]
fn test_scale_two_doubles_every_module() {
    assert_scale_two_doubles(Symbology::QrCode, "Scale test");
}

#[test]
fn test_scale_two_doubles_linear_text() {
    assert_scale_two_doubles(Symbology::Code128, "ABC");
    assert_scale_two_doubles(Symbology::Code39, "SCALE-2");
}

#[test]
fn test_scale_two_doubles_ean_with_addon() {
    assert_scale_two_doubles(Symbology::Eanx, "501234567890+12");
    assert_scale_two_doubles(Symbology::Upca, "72527270270+12345");
}

#[test]
fn test_whitespace_and_border() {
    let mut s = qr("12345", 1.0);
    s.options.whitespace_width = 2;
    s.options.border_width = 1;
    s.options.output_options = OutputOptions::BOX;
    let r = buffered(s, 0);
    // 2 x (whitespace + border) modules around the symbol, 2 pixels each
    assert_eq!(r.width, 42 + 2 * (2 + 1) * 2);
    // Box is ink, whitespace inside it is paper
    assert_eq!(pixel(&r, 0, r.height / 2), [0, 0, 0]);
    assert_eq!(pixel(&r, 2, r.height / 2), [0xff, 0xff, 0xff]);
}

#[test]
fn test_linear_with_text_is_taller() {
    let mut with_text = Symbol::new();
    with_text.options.symbology = Symbology::Code128.id();
    with_text.encode("ABC").unwrap();
    let mut without = with_text.clone();
    without.options.show_hrt = false;

    let a = buffered(with_text, 0);
    let b = buffered(without, 0);
    assert_eq!(a.width, b.width);
    assert_eq!(b.height, 100);
    assert!(a.height > b.height);
}

// ============================================================================
// ROTATION
// ============================================================================

#[test]
fn test_rotation_maps_pixels() {
    let mut s = Symbol::new();
    s.options.symbology = Symbology::Code128.id();
    s.options.show_hrt = false;
    s.encode("Rotate").unwrap();

    let base = buffered(s.clone(), 0);
    let (w, h) = (base.width, base.height);

    let r90 = buffered(s.clone(), 90);
    assert_eq!((r90.width, r90.height), (h, w));
    let r180 = buffered(s.clone(), 180);
    assert_eq!((r180.width, r180.height), (w, h));
    let r270 = buffered(s.clone(), 270);
    assert_eq!((r270.width, r270.height), (h, w));

    for y in (0..h).step_by(7) {
        for x in 0..w {
            let p = pixel(&base, x, y);
            assert_eq!(pixel(&r90, h - 1 - y, x), p);
            assert_eq!(pixel(&r180, w - 1 - x, h - 1 - y), p);
            assert_eq!(pixel(&r270, y, w - 1 - x), p);
        }
    }
}

#[test]
fn test_rotation_round_trips() {
    use barforge::raster::{self, Rotation};

    let mut s = qr("Round trip", 1.0);
    s.options.output_options = OutputOptions::BUFFER_INTERMEDIATE;
    let Pixels::Intermediate(original) = buffered(s.clone(), 0).pixels else {
        panic!("expected palette bytes");
    };

    let mut canvas = raster::Canvas::new(42, 42, 650).unwrap();
    canvas.pixels.copy_from_slice(&original);
    // Break the symmetry so a no-op rotation would be caught
    canvas.set(0, 41, raster::INK);
    canvas.set(41, 0, raster::PAPER);

    let back = raster::rotate(raster::rotate(canvas.clone(), Rotation::Cw90).unwrap(), Rotation::Cw270).unwrap();
    assert_eq!(back, canvas);

    let twice = raster::rotate(raster::rotate(canvas.clone(), Rotation::Cw180).unwrap(), Rotation::Cw180).unwrap();
    assert_eq!(twice, canvas);

    let once = raster::rotate(canvas.clone(), Rotation::Cw90).unwrap();
    assert_ne!(once, canvas);
}

#[test]
fn test_invalid_rotation() {
    let mut s = qr("12345", 1.0);
    let e = s.buffer(45).unwrap_err();
    assert_eq!(e.reason, 223);
    assert_eq!(s.message(), "Error 223: Invalid rotation angle");
}

// ============================================================================
// DOTS AND COLOURS
// ============================================================================

#[test]
fn test_dotty_qr() {
    let mut s = qr("12345", 1.0);
    s.options.output_options = OutputOptions::DOTTY_MODE;
    let r = buffered(s, 0);
    assert!(r.width > 21 && r.height > 21);
    assert_eq!(r.width, r.height);
}

#[test]
fn test_colours_and_alpha() {
    let mut s = qr("12345", 1.0);
    s.options.fg_colour = "0000ff".into();
    s.options.bg_colour = "ffffff00".into();
    let r = buffered(s, 0);
    assert_eq!(pixel(&r, 0, 0), [0, 0, 0xff]);
    let Pixels::Rgb { alpha: Some(alpha), .. } = &r.pixels else {
        panic!("expected an alpha plane");
    };
    assert_eq!(alpha[0], 0xff);
    assert_eq!(alpha[2 * r.width + 2], 0);
}

// ============================================================================
// MAXICODE
// ============================================================================

/// Fills a fixed 33 x 30 MaxiCode grid with the first module set.
struct FixedMaxicode;

impl FlatEncoder for FixedMaxicode {
    fn name(&self) -> &'static str {
        "fixed-maxicode"
    }

    fn encode(&self, symbol: &mut Symbol, _source: &[u8]) -> Result<Option<Warning>> {
        for r in 0..33 {
            let row = (0..30).map(|c| u8::from(r == 0 && c == 0)).collect();
            symbol.grid_mut().push_row(row, 1.0)?;
        }
        symbol.set_height(0.0, 0.0, 0.0);
        Ok(None)
    }
}

#[test]
fn test_maxicode_through_registered_backend() {
    let mut registry = Registry::builtin();
    registry.register_flat(Symbology::Maxicode, FixedMaxicode);
    assert!(registry.has_encoder(Symbology::Maxicode));
    assert!(!Registry::shared().has_encoder(Symbology::Maxicode));

    let mut s = Symbol::new();
    s.options.symbology = Symbology::Maxicode.id();
    s.encode_segs_with(&registry, &[Segment::from("MAXI")]).unwrap();
    assert_eq!((s.rows(), s.width()), (33, 30));

    let r = buffered(s, 0);
    assert_eq!((r.width, r.height), (299, 298));
    // Bullseye centre is paper, first ring ink
    assert_eq!(pixel(&r, 144, 149), [0xff, 0xff, 0xff]);
    assert_eq!(pixel(&r, 154, 149), [0, 0, 0]);
    // The one set module
    assert_eq!(pixel(&r, 4, 4), [0, 0, 0]);
}

#[test]
fn test_maxicode_without_backend() {
    let mut s = Symbol::new();
    s.options.symbology = Symbology::Maxicode.id();
    let e = s.encode("MAXI").unwrap_err();
    assert_eq!(e.reason, 780);
}

// ============================================================================
// FILE OUTPUT
// ============================================================================

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("barforge-{}-{}", std::process::id(), name))
}

#[test]
fn test_encode_and_print_files() {
    for name in ["out.png", "out.bmp", "out.gif", "out.tif", "out.pcx", "out.txt"] {
        let path = temp_path(name);
        let mut s = Symbol::new();
        s.options.symbology = Symbology::Code128.id();
        s.options.outfile = path.clone();
        assert_eq!(s.encode_and_print("File", 0).unwrap(), None, "{}", name);
        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty(), "{}", name);
        std::fs::remove_file(&path).ok();
    }
}

#[test]
fn test_png_file_decodes() {
    let path = temp_path("decode.png");
    let mut s = qr("12345", 2.0);
    s.options.outfile = path.clone();
    s.print(0).unwrap();

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (84, 84));
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_print_keeps_encode_warning() {
    let path = temp_path("legacy.txt");
    let mut s = Symbol::new();
    s.options.symbology = 94;
    s.options.outfile = path.clone();
    let warning = s.encode_and_print("A", 0).unwrap().unwrap();
    assert_eq!(warning.reason, 213);
    assert_eq!(s.status().code(), 2);
    assert!(path.exists());
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_unknown_extension() {
    let mut s = qr("12345", 1.0);
    s.options.outfile = "barforge-out.svg".into();
    let e = s.print(0).unwrap_err();
    assert_eq!(e.reason, 225);
    assert!(!std::path::Path::new("barforge-out.svg").exists());
}

#[test]
fn test_render_to_vec_formats() {
    let mut s = qr("12345", 1.0);
    assert!(s.render_to_vec(Format::Png, 0).unwrap().starts_with(b"\x89PNG"));
    assert!(s.render_to_vec(Format::Gif, 0).unwrap().starts_with(b"GIF8"));
    assert_eq!(s.render_to_vec(Format::Pcx, 0).unwrap()[0], 10);

    let dump = String::from_utf8(s.render_to_vec(Format::Txt, 0).unwrap()).unwrap();
    assert_eq!(dump.lines().count(), 21);
    // 21 modules: five full nibbles plus one padded, spaced in pairs
    assert_eq!(dump.lines().next().unwrap().len(), 8);
}
