use sdl2::pixels::PixelFormatEnum;
use sdl2::render::WindowCanvas;

use c8vm::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use c8vm::FrameBuffer;

/// Length of an RGB24 texture covering the whole frame
const TEXTURE_LEN: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT * 3;

/// An RGB colour, usually parsed from a hex string like `00FF00`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub fn from_rgb(rgb: u32) -> Self {
        Color((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    fn channels(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

/// # Display
/// The Chip-8 display is composed of 64x32 two-colour pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a 2d array.
/// The display only gets a call to `render` when the Chip-8 FrameBuffer is updated.
pub struct Display {
    canvas: WindowCanvas,
    background: Color,
    foreground: Color,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `title` the window title
    /// * `scale` the size multiplier for each pixel
    /// * `background` the colour of unset pixels
    /// * `foreground` the colour of set pixels
    pub fn new(
        sdl: &sdl2::Sdl,
        title: &str,
        scale: u32,
        background: Color,
        foreground: Color,
    ) -> Result<Self, String> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                title,
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .opengl()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| e.to_string())?;

        Ok(Display {
            canvas,
            background,
            foreground,
        })
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.canvas
            .window_mut()
            .set_title(title)
            .map_err(|e| e.to_string())
    }

    /// Formats a Chip-8 FrameBuffer for rendering as an SDL2 texture.
    ///
    /// An SDL2 texture is a 1D array of ints that represent concatenated rows of RGB pixels.
    ///
    /// This creates a two colour rendering by:
    /// - Flattening the 2D frame buffer into a 1D array by concatenating its rows
    /// - Replacing each element of that 1D array with the RGB channels of its colour
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    /// * `background` the colour of 0 pixels
    /// * `foreground` the colour of 1 pixels
    fn frame_to_sdl_texture(frame: &FrameBuffer, background: Color, foreground: Color) -> Vec<u8> {
        let mut texture = Vec::with_capacity(TEXTURE_LEN);
        for &pixel in frame.iter().flat_map(|row| row.iter()) {
            let color = if pixel == 0 { background } else { foreground };
            texture.extend_from_slice(&color.channels());
        }
        texture
    }

    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let pixels = Display::frame_to_sdl_texture(frame, self.background, self.foreground);
        texture.with_lock(None, |buffer: &mut [u8], pitch: usize| {
            for (row, line) in pixels.chunks(DISPLAY_WIDTH * 3).enumerate() {
                buffer[row * pitch..row * pitch + line.len()].copy_from_slice(line);
            }
        })?;

        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
