//! Board renderer module.
//! Draws a puzzle onto a square 19x19 board image and saves it as PNG.
//! Layers, bottom to top: wood background, grid, star points, black stones, white stones, caption.
//! Every coordinate is validated before drawing starts, so a bad puzzle never produces a file.
//! Output is written to a temp file in the target directory and renamed into place.
//! Latency: a few ms for an 800px board; PNG encoding dominates.

use ab_glyph::{FontVec, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use log::{debug, warn};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use crate::puzzle::{BOARD_SIZE, Puzzle, Stone, decode_coordinate};

pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
pub const DEFAULT_CANVAS_SIZE: u32 = 800;
pub const DEFAULT_MARGIN: u32 = 40;

/// Extension of every rendered file.
pub const IMAGE_EXTENSION: &str = "png";
/// File stem used when a title sanitizes to nothing.
pub const FALLBACK_NAME: &str = "problem";

const BACKGROUND: Rgb<u8> = Rgb([240, 200, 150]); // light wood
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const BLACK_STONE: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE_STONE: Rgb<u8> = Rgb([255, 255, 255]);

const GRID_LINE_WIDTH: u32 = 2;
const STAR_POINTS: [usize; 3] = [3, 9, 15];
const STAR_RADIUS_RATIO: f32 = 0.1;
const STONE_RADIUS_RATIO: f32 = 0.4;
/// Distance from the bottom edge to the caption's vertical centre.
const CAPTION_BASELINE_OFFSET: i32 = 10;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid {stone} stone coordinate {coord:?}")]
    InvalidCoordinate { stone: Stone, coord: String },
    #[error("canvas of {canvas}px cannot fit a board with {margin}px margins")]
    InvalidGeometry { canvas: u32, margin: u32 },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Rendering parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Width and height of the image in pixels.
    pub canvas_size: u32,
    /// Blank space between the image edge and the outer grid lines.
    pub margin: u32,
    /// TTF/OTF font for the caption. Missing or unreadable fonts skip the caption.
    pub font_path: PathBuf,
    pub font_size: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            margin: DEFAULT_MARGIN,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Pixel layout of the grid for one canvas size.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Geometry {
    canvas: u32,
    margin: u32,
    step: f32,
}

impl Geometry {
    fn new(canvas: u32, margin: u32) -> Result<Self, RenderError> {
        let span = canvas
            .checked_sub(margin.saturating_mul(2))
            .filter(|&span| span >= (BOARD_SIZE - 1) as u32)
            .ok_or(RenderError::InvalidGeometry { canvas, margin })?;
        Ok(Self {
            canvas,
            margin,
            step: span as f32 / (BOARD_SIZE - 1) as f32,
        })
    }

    /// Pixel position of grid line `index` on either axis.
    fn line(&self, index: usize) -> i32 {
        (self.margin as f32 + index as f32 * self.step).round() as i32
    }

    fn span(&self) -> u32 {
        self.canvas - 2 * self.margin
    }

    fn radius(&self, ratio: f32) -> i32 {
        ((self.step * ratio).round() as i32).max(1)
    }
}

/// Draws and saves puzzle boards with a fixed set of options.
/// The caption font is loaded once, when the renderer is built.
pub struct BoardRenderer {
    options: RenderOptions,
    font: Option<FontVec>,
}

impl BoardRenderer {
    pub fn new(options: RenderOptions) -> Self {
        let font = load_font(&options.font_path);
        Self { options, font }
    }

    /// Builds a renderer without a caption font; titles are not drawn.
    pub fn without_font(options: RenderOptions) -> Self {
        Self {
            options,
            font: None,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draws `puzzle` into an in-memory image.
    pub fn draw(&self, puzzle: &Puzzle) -> Result<RgbImage, RenderError> {
        let geometry = Geometry::new(self.options.canvas_size, self.options.margin)?;
        let stones = locate_stones(puzzle)?;

        // Step 1: Background
        let mut canvas = RgbImage::from_pixel(geometry.canvas, geometry.canvas, BACKGROUND);

        // Step 2: Grid
        let half = (GRID_LINE_WIDTH / 2) as i32;
        for i in 0..BOARD_SIZE {
            let pos = geometry.line(i);
            let start = geometry.margin as i32;
            let length = geometry.span() + 1;
            let vertical = Rect::at(pos - half, start).of_size(GRID_LINE_WIDTH, length);
            let horizontal = Rect::at(start, pos - half).of_size(length, GRID_LINE_WIDTH);
            draw_filled_rect_mut(&mut canvas, vertical, INK);
            draw_filled_rect_mut(&mut canvas, horizontal, INK);
        }

        // Step 3: Star points
        let star_radius = geometry.radius(STAR_RADIUS_RATIO);
        for &col in &STAR_POINTS {
            for &row in &STAR_POINTS {
                let center = (geometry.line(col), geometry.line(row));
                draw_filled_circle_mut(&mut canvas, center, star_radius, INK);
            }
        }

        // Step 4: Stones, black first so white wins on shared points
        let stone_radius = geometry.radius(STONE_RADIUS_RATIO);
        for (stone, col, row) in stones {
            let center = (geometry.line(col), geometry.line(row));
            let fill = match stone {
                Stone::Black => BLACK_STONE,
                Stone::White => WHITE_STONE,
            };
            draw_filled_circle_mut(&mut canvas, center, stone_radius, fill);
            draw_hollow_circle_mut(&mut canvas, center, stone_radius, INK);
        }

        // Step 5: Caption
        if let Some(font) = &self.font {
            if !puzzle.title.is_empty() {
                let scale = PxScale::from(self.options.font_size);
                let (w, h) = text_size(scale, font, &puzzle.title);
                let x = (geometry.canvas as i32 - w as i32) / 2;
                let y = geometry.canvas as i32 - CAPTION_BASELINE_OFFSET - h as i32 / 2;
                draw_text_mut(&mut canvas, INK, x, y, scale, font, &puzzle.title);
            }
        }

        Ok(canvas)
    }

    /// Draws `puzzle` and saves it as `<sanitized title>.png` inside `output_dir`.
    /// Returns the path of the written file.
    pub fn render(
        &self,
        puzzle: &Puzzle,
        output_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, RenderError> {
        let start = Instant::now();
        let canvas = self.draw(puzzle)?;

        let output_dir = output_dir.as_ref();
        let path = output_dir.join(output_file_name(&puzzle.title));
        save_atomically(&canvas, output_dir, &path)?;

        debug!("Rendered {} in {:?}", path.display(), start.elapsed());
        Ok(path)
    }
}

/// Renders `puzzle` with the default caption font and saves it into `output_dir`.
pub fn render_problem(
    puzzle: &Puzzle,
    output_dir: impl AsRef<Path>,
    canvas_size: u32,
    margin: u32,
) -> Result<PathBuf, RenderError> {
    let options = RenderOptions {
        canvas_size,
        margin,
        ..RenderOptions::default()
    };
    BoardRenderer::new(options).render(puzzle, output_dir)
}

/// Converts a title into a file stem: spaces become `_`, and anything other than ASCII
/// letters, digits, `_` and `-` is dropped. Falls back to `problem` when nothing is left.
pub fn sanitize_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => Some(c),
            _ => None,
        })
        .collect();
    if stem.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        stem
    }
}

/// Full file name (stem plus extension) for a puzzle title.
pub fn output_file_name(title: &str) -> String {
    format!("{}.{}", sanitize_filename(title), IMAGE_EXTENSION)
}

// *************** Internal Functions ***************

/// Decodes every stone up front; the first bad coordinate aborts the render.
fn locate_stones(puzzle: &Puzzle) -> Result<Vec<(Stone, usize, usize)>, RenderError> {
    let black = puzzle.black.iter().map(|c| (Stone::Black, c));
    let white = puzzle.white.iter().map(|c| (Stone::White, c));
    black
        .chain(white)
        .map(|(stone, coord)| {
            let (col, row) = decode_coordinate(coord).ok_or_else(|| RenderError::InvalidCoordinate {
                stone,
                coord: coord.clone(),
            })?;
            Ok((stone, col, row))
        })
        .collect()
}

fn load_font(path: &Path) -> Option<FontVec> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Caption font {} unavailable ({}), skipping titles", path.display(), e);
            return None;
        }
    };
    match FontVec::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Caption font {} is unusable ({}), skipping titles", path.display(), e);
            None
        }
    }
}

/// Encodes into a temp file next to `path`, then renames it over `path`.
/// The temp file is removed on any failure, so readers never see a partial image.
fn save_atomically(canvas: &RgbImage, dir: &Path, path: &Path) -> Result<(), RenderError> {
    let io_err = |source: std::io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".tsumego-")
        .suffix(".png.tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        canvas
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|source| RenderError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(io_err)?;
    }

    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use tempfile::tempdir;

    fn puzzle(title: &str, black: &[&str], white: &[&str]) -> Puzzle {
        Puzzle::new(
            title,
            black.iter().map(|c| c.to_string()).collect(),
            white.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn renderer(canvas_size: u32, margin: u32) -> BoardRenderer {
        BoardRenderer::without_font(RenderOptions {
            canvas_size,
            margin,
            ..RenderOptions::default()
        })
    }

    #[test]
    fn test_render_writes_named_png() {
        let dir = tempdir().unwrap();
        let prob = puzzle("TestX", &["dd", "ee"], &["cc"]);
        let path = render_problem(&prob, dir.path(), 200, 20).unwrap();

        assert_eq!(path, dir.path().join("TestX.png"));
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (200, 200));
    }

    #[test]
    fn test_render_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        renderer(200, 20).render(&puzzle("A", &["aa"], &[]), dir.path()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["A.png".to_string()]);
    }

    #[test]
    fn test_render_creates_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("today");
        let path = renderer(100, 10).render(&puzzle("", &["aa"], &[]), &nested).unwrap();
        assert_eq!(path, nested.join("problem.png"));
        assert!(path.exists());
    }

    #[test]
    fn test_save_failure_cleans_up_temp_file() {
        let dir = tempdir().unwrap();
        // A non-empty directory squatting on the output name cannot be replaced
        let blocker = dir.path().join("TestX.png");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), b"x").unwrap();

        let err = renderer(200, 20)
            .render(&puzzle("TestX", &["dd"], &["cc"]), dir.path())
            .unwrap_err();
        match &err {
            RenderError::Io { path, .. } => assert_eq!(path, &blocker),
            other => panic!("unexpected error: {other:?}"),
        }

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["TestX.png".to_string()]);
        assert!(blocker.join("keep").is_file());
    }

    #[test]
    fn test_invalid_coordinate_writes_nothing() {
        let dir = tempdir().unwrap();
        let prob = puzzle("Bad", &["dd"], &["zz"]);
        let err = renderer(200, 20).render(&prob, dir.path()).unwrap_err();

        match &err {
            RenderError::InvalidCoordinate { stone, coord } => {
                assert_eq!(*stone, Stone::White);
                assert_eq!(coord, "zz");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("\"zz\""));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_every_legal_coordinate_renders() {
        let r = renderer(60, 3);
        for x in b'a'..=b's' {
            let coords: Vec<String> = (b'a'..=b's')
                .map(|y| String::from_utf8(vec![x, y]).unwrap())
                .collect();
            let prob = Puzzle::new("", coords, Vec::new());
            assert!(r.draw(&prob).is_ok());
        }
        for bad in ["ta", "at", "a", "abc", "A1", "`a"] {
            assert!(r.draw(&puzzle("", &[bad], &[])).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn test_pixels() {
        let img = renderer(200, 20).draw(&puzzle("", &["ee"], &["cc"])).unwrap();
        let g = Geometry::new(200, 20).unwrap();

        // Corner is background
        assert_eq!(*img.get_pixel(2, 2), BACKGROUND);
        // Grid line through the top-left intersection
        let edge = g.line(0) as u32;
        assert_eq!(*img.get_pixel(edge, edge + 30), INK);
        // Stone centres
        let c = g.line(2) as u32;
        assert_eq!(*img.get_pixel(c, c), WHITE_STONE);
        let e = g.line(4) as u32;
        assert_eq!(*img.get_pixel(e, e), BLACK_STONE);
        // Star point at (9, 9), away from any stone
        let tengen = g.line(9) as u32;
        assert_eq!(*img.get_pixel(tengen, tengen), INK);
    }

    #[test]
    fn test_geometry_validation() {
        assert!(matches!(
            Geometry::new(40, 20),
            Err(RenderError::InvalidGeometry { canvas: 40, margin: 20 })
        ));
        assert!(Geometry::new(50, 20).is_err());
        assert!(Geometry::new(58, 20).is_ok());
        assert!(Geometry::new(10, u32::MAX).is_err());

        let g = Geometry::new(800, 40).unwrap();
        assert_eq!(g.line(0), 40);
        assert_eq!(g.line(18), 760);
        assert_eq!(g.radius(STONE_RADIUS_RATIO), 16);
        assert_eq!(g.radius(STAR_RADIUS_RATIO), 4);
    }

    #[test]
    fn test_missing_font_skips_caption() {
        let dir = tempdir().unwrap();
        let options = RenderOptions {
            canvas_size: 120,
            margin: 10,
            font_path: dir.path().join("no-such-font.ttf"),
            ..RenderOptions::default()
        };
        let r = BoardRenderer::new(options);
        assert!(!r.has_font());
        let with_title = r.draw(&puzzle("Caption", &["aa"], &[])).unwrap();
        let without = r.draw(&puzzle("", &["aa"], &[])).unwrap();
        assert_eq!(with_title, without);
    }

    #[test]
    fn test_garbage_font_file_is_ignored() {
        let dir = tempdir().unwrap();
        let font_path = dir.path().join("fake.ttf");
        fs::write(&font_path, b"not a font").unwrap();
        let r = BoardRenderer::new(RenderOptions {
            font_path,
            ..RenderOptions::default()
        });
        assert!(!r.has_font());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Example problem"), "Example_problem");
        assert_eq!(sanitize_filename("Life & Death #3"), "Life__Death_3");
        assert_eq!(sanitize_filename("a-b_c"), "a-b_c");
        assert_eq!(sanitize_filename("élan"), "lan");
        assert_eq!(sanitize_filename(""), "problem");
        assert_eq!(sanitize_filename("!!!"), "problem");
        assert_eq!(sanitize_filename("../../etc"), "etc");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for title in ["Example problem", "x/y z", "", "???", "Go-Problem_12"] {
            let once = sanitize_filename(title);
            assert_eq!(sanitize_filename(&once), once);
        }
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("TestX"), "TestX.png");
        assert_eq!(output_file_name(""), "problem.png");
    }
}
