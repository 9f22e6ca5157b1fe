//! SVG map pins colored by trust level.

use crate::trust::{TrustLevel, classify};

/// Pixel size of the rendered pin.
pub const ICON_SIZE: (u32, u32) = (34, 46);

/// Point of the pin that sits on the spot's coordinates (bottom tip).
pub const ICON_ANCHOR: (i32, i32) = (17, 46);

/// Offset of an attached popup relative to the anchor.
pub const POPUP_ANCHOR: (i32, i32) = (0, -48);

const CHECK_MARK: &str = "\u{2713}";

/// The text drawn inside the pin's white disc.
pub fn label(score: i64) -> String {
  match classify(score) {
    TrustLevel::Confirmed => CHECK_MARK.to_owned(),
    _ => score.to_string(),
  }
}

/// Render the pin for a spot with the given score.
pub fn render(score: i64) -> String {
  let meta = classify(score).meta();
  let label = label(score);
  // Counted in chars so the check mark is one glyph wide.
  let font_size = if label.chars().count() > 2 { 7 } else { 9 };
  let (width, height) = ICON_SIZE;

  format!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
  <defs>
    <filter id="sh" x="-40%" y="-20%" width="180%" height="160%">
      <feDropShadow dx="0" dy="3" stdDeviation="3" flood-color="{glow}" />
    </filter>
  </defs>
  <path d="M17 2C9.82 2 4 7.82 4 15c0 10 13 28 13 28s13-18 13-28c0-7.18-5.82-13-13-13z" fill="{fill}" stroke="white" stroke-width="2.5" filter="url(#sh)" />
  <circle cx="17" cy="15" r="7" fill="white" opacity="0.92" />
  <text x="17" y="19" text-anchor="middle" font-family="Inter, system-ui, sans-serif" font-size="{font_size}" font-weight="700" fill="{fill}">{label}</text>
</svg>
"##,
    glow = meta.glow,
    fill = meta.fill,
  )
}
