use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

const SAMPLE_FREQ: i32 = 44100;
const SAMPLES: u16 = 2048;
const VOLUME: i16 = i16::MAX / 4;

/// A square wave at a fixed pitch
pub struct SquareWave {
    period: u32,
    half_period: u32,
    phase: u32,
}

impl SquareWave {
    /// # Arguments
    /// * `freq` the sample rate the audio device settled on
    /// * `tone` the pitch in Hz; 0 means the sample rate itself
    pub fn new(freq: u32, tone: u16) -> Self {
        let tone = if tone == 0 { freq } else { u32::from(tone) };
        let period = (freq / tone).max(1);
        SquareWave {
            period,
            half_period: period / 2,
            phase: 0,
        }
    }
}

impl AudioCallback for SquareWave {
    type Channel = i16;

    fn callback(&mut self, out: &mut [i16]) {
        for sample in out.iter_mut() {
            *sample = if self.phase < self.half_period {
                -VOLUME
            } else {
                VOLUME
            };
            self.phase = (self.phase + 1) % self.period;
        }
    }
}

/// # Beeper
/// Plays a tone while the Chip-8 sound timer is running.
pub struct Beeper {
    device: AudioDevice<SquareWave>,
    beeping: bool,
}

impl Beeper {
    pub fn new(sdl: &sdl2::Sdl, tone: u16) -> Result<Self, String> {
        let audio = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(SAMPLE_FREQ),
            channels: Some(1),
            samples: Some(SAMPLES),
        };
        let device = audio.open_playback(None, &desired, |spec| {
            SquareWave::new(spec.freq as u32, tone)
        })?;

        Ok(Beeper {
            device,
            beeping: false,
        })
    }

    pub fn beep(&mut self) {
        if !self.beeping {
            self.device.resume();
            self.beeping = true;
        }
    }

    pub fn mute(&mut self) {
        if self.beeping {
            self.device.pause();
            self.beeping = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_wave_alternates_each_half_period() {
        // 8 samples per period
        let mut wave = SquareWave::new(8 * 440, 440);
        let mut out = [0i16; 16];
        wave.callback(&mut out);
        assert_eq!(out[0..4], [-VOLUME; 4]);
        assert_eq!(out[4..8], [VOLUME; 4]);
        assert_eq!(out[8..12], [-VOLUME; 4]);
    }

    #[test]
    fn test_square_wave_keeps_phase_between_callbacks() {
        let mut wave = SquareWave::new(8 * 440, 440);
        let mut out = [0i16; 3];
        wave.callback(&mut out);
        wave.callback(&mut out);
        assert_eq!(out, [-VOLUME, VOLUME, VOLUME]);
    }

    #[test]
    fn test_zero_tone_is_flat() {
        let mut wave = SquareWave::new(44100, 0);
        let mut out = [0i16; 4];
        wave.callback(&mut out);
        assert_eq!(out, [VOLUME; 4]);
    }
}
