use std::collections::HashMap;

use once_cell::sync::Lazy;

const FONT_HEIGHT: usize = 7;
const FONT_WIDTH: usize = 5;
const SHADOW_OFFSET: usize = 2;
const FILL_CHAR: char = '█';
const OUTLINE_CHAR: char = '░';

/// Rows produced for any input, padding included.
pub const BANNER_HEIGHT: usize = FONT_HEIGHT + SHADOW_OFFSET;

type Glyph = [&'static str; FONT_HEIGHT];

static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        (
            '0',
            [
                " 111 ", "1   1", "1  11", "1 1 1", "11  1", "1   1", " 111 ",
            ],
        ),
        (
            '1',
            [
                "  1  ", " 11  ", "1 1  ", "  1  ", "  1  ", "  1  ", "11111",
            ],
        ),
        (
            '2',
            [
                " 111 ", "1   1", "    1", "   1 ", "  1  ", " 1   ", "11111",
            ],
        ),
        (
            '3',
            [
                " 111 ", "1   1", "    1", "  11 ", "    1", "1   1", " 111 ",
            ],
        ),
        (
            '4',
            [
                "   1 ", "  11 ", " 1 1 ", "1  1 ", "11111", "   1 ", "   1 ",
            ],
        ),
        (
            '5',
            [
                "11111", "1    ", "1    ", "1111 ", "    1", "1   1", " 111 ",
            ],
        ),
        (
            '6',
            [
                " 111 ", "1   1", "1    ", "1111 ", "1   1", "1   1", " 111 ",
            ],
        ),
        (
            '7',
            [
                "11111", "    1", "   1 ", "  1  ", " 1   ", "1    ", "1    ",
            ],
        ),
        (
            '8',
            [
                " 111 ", "1   1", "1   1", " 111 ", "1   1", "1   1", " 111 ",
            ],
        ),
        (
            '9',
            [
                " 111 ", "1   1", "1   1", " 1111", "    1", "1   1", " 111 ",
            ],
        ),
        (
            '×',
            [
                "     ", "1   1", " 1 1 ", "  1  ", " 1 1 ", "1   1", "     ",
            ],
        ),
        (
            '=',
            [
                "     ", "     ", "11111", "     ", "11111", "     ", "     ",
            ],
        ),
        (
            '/',
            [
                "    1", "   1 ", "   1 ", "  1  ", " 1   ", "1    ", "1    ",
            ],
        ),
        (
            ' ',
            [
                "     ", "     ", "     ", "     ", "     ", "     ", "     ",
            ],
        ),
        (
            '?',
            [
                " 111 ", "1   1", "    1", "   1 ", "  1  ", "     ", "  1  ",
            ],
        ),
    ])
});

fn normalize(ch: char) -> char {
    match ch {
        'x' | 'X' | '*' => '×',
        other => other,
    }
}

/// Render the provided text using the block font with layered outline.
/// Every returned row is padded to the same width so styled segments can
/// be lined up side by side.
pub fn render(text: &str) -> Vec<String> {
    let content: Vec<char> = text.chars().map(normalize).collect();
    if content.is_empty() {
        return vec![String::new(); BANNER_HEIGHT];
    }

    let glyph_width = FONT_WIDTH * 2; // double width for chunky appearance
    let spacing = 2;
    let total_width =
        content.len() * glyph_width + (content.len().saturating_sub(1)) * spacing + SHADOW_OFFSET;
    let mut canvas = vec![vec![' '; total_width]; BANNER_HEIGHT];

    for (index, ch) in content.iter().enumerate() {
        let glyph = GLYPHS.get(ch).or_else(|| GLYPHS.get(&'?')).unwrap();
        let x_offset = index * (glyph_width + spacing);
        paint_glyph(&mut canvas, glyph, x_offset);
    }

    canvas
        .into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect()
}

fn paint_glyph(canvas: &mut [Vec<char>], glyph: &Glyph, x_offset: usize) {
    for (row_idx, row) in glyph.iter().enumerate() {
        for (col_idx, symbol) in row.chars().enumerate() {
            if symbol != '1' {
                continue;
            }
            let base_y = row_idx;
            let base_x = x_offset + col_idx * 2;
            apply_fill(canvas, base_y, base_x);
        }
    }
}

fn apply_fill(canvas: &mut [Vec<char>], y: usize, x: usize) {
    place(
        canvas,
        y + SHADOW_OFFSET,
        x + SHADOW_OFFSET * 2,
        OUTLINE_CHAR,
    );
    place(
        canvas,
        y + SHADOW_OFFSET,
        x + SHADOW_OFFSET * 2 + 1,
        OUTLINE_CHAR,
    );
    place(
        canvas,
        y + SHADOW_OFFSET - 1,
        x + SHADOW_OFFSET * 2,
        OUTLINE_CHAR,
    );
    place(
        canvas,
        y + SHADOW_OFFSET - 1,
        x + SHADOW_OFFSET * 2 + 1,
        OUTLINE_CHAR,
    );

    place(canvas, y, x, FILL_CHAR);
    place(canvas, y, x + 1, FILL_CHAR);
}

fn place(canvas: &mut [Vec<char>], y: usize, x: usize, ch: char) {
    if y >= canvas.len() || x >= canvas[y].len() {
        return;
    }
    let cell = &mut canvas[y][x];
    if *cell == ' ' || (*cell == OUTLINE_CHAR && ch == FILL_CHAR) {
        *cell = ch;
    }
}
