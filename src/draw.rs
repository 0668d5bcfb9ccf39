use embedded_graphics::{
    image::{Image, ImageRaw},
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, Triangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use embedded_text::{
    alignment::{HorizontalAlignment, VerticalAlignment}, style::TextBoxStyleBuilder, TextBox
};

/// Ink on the e-paper panel
pub const INK: BinaryColor = BinaryColor::On;
/// Unpainted paper
pub const PAPER: BinaryColor = BinaryColor::Off;

pub fn draw_line<D>(
    target: &mut D,
    start: Point,
    end: Point,
    color: BinaryColor,
    width: u32
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>
{
    Line::new(start, end)
        .into_styled(PrimitiveStyleBuilder::new().stroke_width(width).stroke_color(color).build())
        .draw(target)?;
    Ok(())
}

/// Horizontal run of `dashes` dashes across `width`, each half a slot long.
pub fn draw_dashed_hline<D>(
    target: &mut D,
    start: Point,
    width: u32,
    dashes: i32,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if dashes <= 0 {
        return Ok(());
    }
    let dash_len = (width as i32 / (2 * dashes)).max(1);
    for j in 0..dashes {
        let x = start.x + j * width as i32 / dashes;
        draw_line(target, Point::new(x, start.y), Point::new(x + dash_len - 1, start.y), color, 1)?;
    }
    Ok(())
}

pub fn fill_triangle<D>(
    target: &mut D,
    a: Point,
    b: Point,
    c: Point,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Triangle::new(a, b, c)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)?;
    Ok(())
}

pub fn draw_rectangle<D>(
    target: &mut D,
    top_left: Point,
    w: u32,
    h: u32,
    fill: Option<BinaryColor>,
    border_width: Option<u32>,
    border_color: Option<BinaryColor>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let mut style = PrimitiveStyleBuilder::new();
    if let Some(color) = fill {
        style = style.fill_color(color);
    }
    if let (Some(width), Some(color)) = (border_width, border_color) {
        style = style.stroke_color(color).stroke_width(width);
    }
    Rectangle::new(top_left, Size::new(w, h))
        .into_styled(style.build())
        .draw(target)?;
    Ok(())
}

pub fn draw_circle_from_center<D>(
    target: &mut D,
    center: Point,
    radius: u32,
    style: PrimitiveStyle<BinaryColor>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Circle::with_center(center, radius * 2 + 1)
        .into_styled(style)
        .draw(target)?;
    Ok(())
}

/// Single line of ink text. `anchor.y` is the top of the text, `anchor.x`
/// its left edge, centre or right edge depending on `align`.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    anchor: Point,
    font: &MonoFont,
    align: Alignment,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let character_style = MonoTextStyle::new(font, INK);
    let text_style = TextStyleBuilder::new()
        .alignment(align)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(text, anchor, character_style, text_style).draw(target)?;
    Ok(())
}

/// Wrapped text centred in a region.
pub fn draw_text_region_center<D>(
    target: &mut D,
    text: &str,
    region: Rectangle,
    font: &MonoFont,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let character_style = MonoTextStyle::new(font, INK);
    let textbox_style = TextBoxStyleBuilder::new()
        .alignment(HorizontalAlignment::Center)
        .vertical_alignment(VerticalAlignment::Middle)
        .build();
    TextBox::with_textbox_style(text, region, character_style, textbox_style).draw(target)?;
    Ok(())
}

pub fn draw_bitmap<D>(
    target: &mut D,
    raw: &ImageRaw<'_, BinaryColor>,
    top_left: Point,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Image::new(raw, top_left).draw(target)?;
    Ok(())
}

pub fn draw_glyph<D>(
    target: &mut D,
    data: &[u8; 8],
    top_left: Point,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let raw = ImageRaw::<BinaryColor>::new(data, 8);
    draw_bitmap(target, &raw, top_left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut fb = VarFrameBuf::new(100, 4, PAPER);
        draw_dashed_hline(&mut fb, Point::new(0, 1), 100, 10, INK).unwrap();
        // 10 dashes of 5 pixels
        assert_eq!(fb.count(INK), 50);
        assert_eq!(fb.pixel(Point::new(0, 1)), Some(INK));
        assert_eq!(fb.pixel(Point::new(5, 1)), Some(PAPER));
        assert_eq!(fb.pixel(Point::new(10, 1)), Some(INK));
    }

    #[test]
    fn test_outline_rectangle_leaves_inside() {
        let mut fb = VarFrameBuf::new(20, 20, PAPER);
        draw_rectangle(&mut fb, Point::new(2, 2), 10, 10, None, Some(1), Some(INK)).unwrap();
        assert_eq!(fb.pixel(Point::new(2, 2)), Some(INK));
        assert_eq!(fb.pixel(Point::new(6, 6)), Some(PAPER));
    }

    #[test]
    fn test_centered_text_straddles_anchor() {
        let mut fb = VarFrameBuf::new(100, 20, PAPER);
        draw_text(
            &mut fb,
            "MMMM",
            Point::new(50, 2),
            &embedded_graphics::mono_font::ascii::FONT_6X10,
            Alignment::Center,
        )
        .unwrap();
        let left = Rectangle::new(Point::new(0, 0), Size::new(50, 20));
        let right = Rectangle::new(Point::new(50, 0), Size::new(50, 20));
        assert!(fb.count_in(&left, INK) > 0);
        assert!(fb.count_in(&right, INK) > 0);
    }
}
