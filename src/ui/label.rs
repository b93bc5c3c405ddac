//! Fixed-position text region

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::config::RegionLayout;

const BUF_LEN: usize = 8;

/// Text drawn centered vertically in a filled frame
pub struct Label {
    str_buf: [u8; BUF_LEN],
    len: usize,
    frame: Rectangle,
    background: Rgb565,
    character_style: MonoTextStyle<'static, Rgb565>,
    alignment: Alignment,
    hidden: bool,
}

impl Label {
    /// Create an empty, visible label
    pub fn new(layout: &RegionLayout, font: &'static MonoFont<'static>, background: Rgb565) -> Self {
        let mut character_style = MonoTextStyle::new(font, layout.text_color);
        character_style.background_color = Some(background);

        Self {
            str_buf: [0; BUF_LEN],
            len: 0,
            frame: layout.frame,
            background,
            character_style,
            alignment: layout.alignment,
            hidden: false,
        }
    }

    /// Replace the text. Longer text is cut at the buffer size.
    pub fn set_text(&mut self, text: &str) {
        let mut len = text.len().min(BUF_LEN);
        while !text.is_char_boundary(len) {
            len -= 1;
        }
        self.str_buf[..len].copy_from_slice(&text.as_bytes()[..len]);
        self.len = len;
    }

    pub fn text(&self) -> &str {
        // Only whole characters are ever copied in
        core::str::from_utf8(&self.str_buf[..self.len]).unwrap_or_default()
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn frame(&self) -> Rectangle {
        self.frame
    }

    pub fn text_color(&self) -> Option<Rgb565> {
        self.character_style.text_color
    }

    /// Anchor of the text: vertical middle of the frame, horizontally
    /// at the aligned edge.
    fn anchor(&self) -> Point {
        let center = self.frame.center();
        let x = match self.alignment {
            Alignment::Left => self.frame.top_left.x,
            Alignment::Center => center.x,
            Alignment::Right => self.frame.top_left.x + self.frame.size.width as i32 - 1,
        };
        Point::new(x, center.y)
    }
}

impl Drawable for Label {
    type Color = Rgb565;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        if self.hidden {
            return Ok(());
        }

        self.frame
            .into_styled(PrimitiveStyle::with_fill(self.background))
            .draw(target)?;

        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(self.text(), self.anchor(), self.character_style, text_style)
            .draw(&mut target.clipped(&self.frame))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, ELECTRIC_BLUE};
    use crate::ui::tests::Framebuffer;
    use profont::PROFONT_24_POINT;

    fn label() -> Label {
        Label::new(&LayoutConfig::WITH_DATE.hour, &PROFONT_24_POINT, Rgb565::BLACK)
    }

    #[test]
    fn test_text() {
        let mut label = label();
        assert_eq!(label.text(), "");
        label.set_text("14");
        assert_eq!(label.text(), "14");
        label.set_text("a much longer text");
        assert_eq!(label.text(), "a much l");
        label.set_text("éééééé");
        assert_eq!(label.text(), "éééé");
    }

    #[test]
    fn test_draws_inside_frame() {
        let mut label = label();
        label.set_text("14");
        let mut fb = Framebuffer::new();
        label.draw(&mut fb).unwrap();

        let frame = label.frame();
        assert_eq!(fb.touched_outside(&frame), 0);
        assert!(fb.count_inside(&frame, ELECTRIC_BLUE) > 0);
    }

    #[test]
    fn test_hidden_draws_nothing() {
        let mut label = label();
        label.set_text("14");
        label.set_hidden(true);
        let mut fb = Framebuffer::new();
        label.draw(&mut fb).unwrap();
        assert_eq!(fb.draw_calls, 0);
        assert!(fb.untouched());
    }
}
