//! Ruled-table detection from PDF content streams.
//!
//! Walks the page's drawing operations looking for ruling lines (thin
//! rectangles and straight path segments), clusters them into a grid, and
//! fills the grid cells with the page's words. Borderless statements draw
//! no rules and produce no tables, which is what routes them to the
//! word-geometry tier.

use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::trace;

use super::{PageTable, PageWord};

/// Positions closer than this are treated as the same ruling line.
const LINE_CLUSTER_TOL: f32 = 3.0;

/// Rect edges at most this thick are ruling lines, not boxes.
const RULE_THICKNESS: f32 = 2.0;

/// Vertical tolerance when grouping cell words into lines.
const CELL_LINE_TOL: f32 = 4.0;

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Detect ruled tables on a page. `words` must be in top-down coordinates;
/// `page_height` is used to flip the content stream's bottom-up y axis.
pub fn tables_for_page(
    doc: &Document,
    page_index: usize,
    words: &[PageWord],
    page_height: f32,
) -> Vec<PageTable> {
    let pages = doc.get_pages();
    let page_id = match pages.get(&((page_index + 1) as u32)) {
        Some(id) => *id,
        None => return Vec::new(),
    };
    let raw = match doc.get_page_content(page_id) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    let content = match Content::decode(&raw) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };

    // Horizontal rules as (y, x0, x1); vertical rules as (x, y0, y1).
    let mut h_rules: Vec<(f32, f32, f32)> = Vec::new();
    let mut v_rules: Vec<(f32, f32, f32)> = Vec::new();
    let mut current: Option<(f32, f32)> = None;

    let flip = |y: f32| page_height - y;

    for op in &content.operations {
        let nums: Vec<f32> = op.operands.iter().filter_map(number).collect();
        match op.operator.as_str() {
            "m" if nums.len() >= 2 => {
                current = Some((nums[0], nums[1]));
            }
            "l" if nums.len() >= 2 => {
                if let Some((x0, y0)) = current {
                    let (x1, y1) = (nums[0], nums[1]);
                    if (y1 - y0).abs() <= RULE_THICKNESS && (x1 - x0).abs() > RULE_THICKNESS {
                        h_rules.push((flip(y0), x0.min(x1), x0.max(x1)));
                    } else if (x1 - x0).abs() <= RULE_THICKNESS
                        && (y1 - y0).abs() > RULE_THICKNESS
                    {
                        v_rules.push((x0, flip(y0.max(y1)), flip(y0.min(y1))));
                    }
                }
                current = Some((nums[0], nums[1]));
            }
            "re" if nums.len() >= 4 => {
                let (x, y, w, h) = (nums[0], nums[1], nums[2], nums[3]);
                if h.abs() <= RULE_THICKNESS && w.abs() > RULE_THICKNESS {
                    h_rules.push((flip(y), x, x + w));
                } else if w.abs() <= RULE_THICKNESS && h.abs() > RULE_THICKNESS {
                    v_rules.push((x, flip(y + h), flip(y)));
                } else if w.abs() > RULE_THICKNESS && h.abs() > RULE_THICKNESS {
                    // Cell drawn as a box: all four edges are rules.
                    h_rules.push((flip(y), x, x + w));
                    h_rules.push((flip(y + h), x, x + w));
                    v_rules.push((x, flip(y + h), flip(y)));
                    v_rules.push((x + w, flip(y + h), flip(y)));
                }
            }
            _ => {}
        }
    }

    let row_ys = cluster(h_rules.iter().map(|r| r.0));
    let col_xs = cluster(v_rules.iter().map(|r| r.0));

    if row_ys.len() < 2 || col_xs.len() < 2 {
        return Vec::new();
    }

    trace!(
        rows = row_ys.len() - 1,
        cols = col_xs.len() - 1,
        page = page_index + 1,
        "ruling grid detected"
    );

    let mut table: PageTable = Vec::new();
    let mut any_text = false;

    for band in row_ys.windows(2) {
        let (y_top, y_bot) = (band[0], band[1]);
        let mut row: Vec<String> = Vec::new();
        for cols in col_xs.windows(2) {
            let (x_left, x_right) = (cols[0], cols[1]);
            let cell_words: Vec<&PageWord> = words
                .iter()
                .filter(|w| {
                    let xm = w.x_mid();
                    let ym = w.y_mid();
                    xm >= x_left && xm < x_right && ym >= y_top && ym < y_bot
                })
                .collect();
            let text = join_cell(&cell_words);
            if !text.is_empty() {
                any_text = true;
            }
            row.push(text);
        }
        table.push(row);
    }

    if any_text {
        vec![table]
    } else {
        Vec::new()
    }
}

/// Merge near-identical coordinates into sorted cluster centers.
fn cluster(values: impl Iterator<Item = f32>) -> Vec<f32> {
    let mut sorted: Vec<f32> = values.collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut out: Vec<f32> = Vec::new();
    for v in sorted {
        match out.last() {
            Some(last) if (v - last).abs() <= LINE_CLUSTER_TOL => {}
            _ => out.push(v),
        }
    }
    out
}

/// Join a cell's words: space within a text line, newline between lines.
fn join_cell(words: &[&PageWord]) -> String {
    if words.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&PageWord> = words.to_vec();
    sorted.sort_by(|a, b| {
        (a.top, a.x0)
            .partial_cmp(&(b.top, b.x0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_top = f32::NEG_INFINITY;
    for w in sorted {
        if (w.top - line_top).abs() > CELL_LINE_TOL && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(w.text.trim());
        line_top = w.top;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}
