/// Sound engine: procedural 8-bit style cues via rodio.
///
/// Each `AudioCue` is described as a short list of segments (a pitch sweep
/// with some noise and overtones) and rendered to an in-memory WAV buffer
/// once at init. Playback is fire-and-forget on a detached Sink.
///
/// Background music is a few bars rendered the same way and looped on its
/// own quieter Sink for the rest of the process.
///
/// Compile without the "sound" feature to disable audio entirely (the
/// stub SoundEngine does nothing).

use crate::sim::event::AudioCue;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

/// One piece of a cue: a sweep from `from_hz` to `to_hz` over `secs`.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
struct Segment {
    from_hz: f32,
    to_hz: f32,
    secs: f32,
    /// Share of white noise mixed into the tone, 0..=1.
    noise: f32,
    /// Relative weights of the 2nd and 3rd harmonics.
    overtones: [f32; 2],
    /// Decay exponent; larger fades faster. 0 keeps full volume.
    decay: f32,
}

impl Segment {
    const fn note(hz: f32, secs: f32) -> Self {
        Segment { from_hz: hz, to_hz: hz, secs, noise: 0.0, overtones: [0.0, 0.0], decay: 0.3 }
    }

    const fn sweep(from_hz: f32, to_hz: f32, secs: f32) -> Self {
        Segment { from_hz, to_hz, secs, noise: 0.0, overtones: [0.0, 0.0], decay: 0.6 }
    }

    const fn bright(self, second: f32, third: f32) -> Self {
        Segment { overtones: [second, third], ..self }
    }

    const fn noisy(self, noise: f32) -> Self {
        Segment { noise, ..self }
    }

    const fn fading(self, decay: f32) -> Self {
        Segment { decay, ..self }
    }
}

// C6 E6 G6
const GOLD: &[Segment] = &[
    Segment::note(1047.0, 0.045).bright(0.0, 0.3).fading(0.5),
    Segment::note(1319.0, 0.045).bright(0.0, 0.3).fading(0.5),
    Segment::note(1568.0, 0.045).bright(0.0, 0.3).fading(0.5),
];

const DIG: &[Segment] = &[
    Segment::sweep(500.0, 200.0, 0.12).noisy(0.6).fading(0.8),
];

const FALL: &[Segment] = &[
    Segment::sweep(600.0, 200.0, 0.15),
];

// C5 E5 G5 C6, last note held
const WIN: &[Segment] = &[
    Segment::note(523.0, 0.1).bright(0.3, 0.1),
    Segment::note(659.0, 0.1).bright(0.3, 0.1),
    Segment::note(784.0, 0.1).bright(0.3, 0.1),
    Segment::note(1047.0, 0.35).bright(0.3, 0.1).fading(1.0),
];

// A4 F#4 Eb4 C4
const LOSE: &[Segment] = &[
    Segment::note(440.0, 0.12),
    Segment::note(370.0, 0.12),
    Segment::note(311.0, 0.12),
    Segment::note(261.0, 0.2).fading(1.0),
];

// A minor arpeggio loop: Am, F, C, G. Each note decays to near silence
// so the loop seam does not click.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const MUSIC: &[Segment] = &[
    Segment::note(220.0, 0.2), Segment::note(262.0, 0.2), Segment::note(330.0, 0.2), Segment::note(262.0, 0.2),
    Segment::note(175.0, 0.2), Segment::note(220.0, 0.2), Segment::note(262.0, 0.2), Segment::note(220.0, 0.2),
    Segment::note(131.0, 0.2), Segment::note(165.0, 0.2), Segment::note(196.0, 0.2), Segment::note(165.0, 0.2),
    Segment::note(196.0, 0.2), Segment::note(247.0, 0.2), Segment::note(294.0, 0.2), Segment::note(247.0, 0.2),
];

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const MUSIC_VOLUME: f32 = 0.35;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn segments(cue: AudioCue) -> &'static [Segment] {
    match cue {
        AudioCue::Gold => GOLD,
        AudioCue::Dig => DIG,
        AudioCue::Fall => FALL,
        AudioCue::Win => WIN,
        AudioCue::Lose => LOSE,
    }
}

/// Render segments to mono samples in -1..=1.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn synthesize(segments: &[Segment]) -> Vec<f32> {
    use std::f32::consts::TAU;

    let mut out = Vec::new();
    // Fixed LCG so every run sounds the same.
    let mut noise_state: u32 = 12345;
    let mut phase = 0.0_f32;
    for seg in segments {
        let n = (SAMPLE_RATE as f32 * seg.secs) as usize;
        for i in 0..n {
            let t = i as f32 / n as f32;
            let hz = seg.from_hz + (seg.to_hz - seg.from_hz) * t;
            phase = (phase + hz / SAMPLE_RATE as f32).fract();
            let [h2, h3] = seg.overtones;
            let tone = ((phase * TAU).sin() + (phase * 2.0 * TAU).sin() * h2 + (phase * 3.0 * TAU).sin() * h3)
                / (1.0 + h2 + h3);

            noise_state = noise_state.wrapping_mul(1103515245).wrapping_add(12345);
            let noise = (noise_state as f32 / u32::MAX as f32) * 2.0 - 1.0;

            let env = (1.0 - t).powf(seg.decay);
            out.push((tone * (1.0 - seg.noise) + noise * seg.noise) * env * 0.3);
        }
    }
    out
}

/// Wrap mono f32 samples into a 16-bit PCM WAV file.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;
    let block_align = CHANNELS * BITS / 8;
    let byte_rate = SAMPLE_RATE * block_align as u32;
    let data_size = samples.len() as u32 * block_align as u32;

    let mut buf = Vec::with_capacity(44 + data_size as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::{make_wav, segments, synthesize, AudioCue, MUSIC, MUSIC_VOLUME};

    const CUES: [AudioCue; 5] = [
        AudioCue::Gold, AudioCue::Dig, AudioCue::Fall, AudioCue::Win, AudioCue::Lose,
    ];

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// WAV bytes, in `CUES` order.
        wavs: Vec<Arc<[u8]>>,
        music: Arc<[u8]>,
        /// Keeps the music playing; dropped with the engine.
        music_sink: Option<Sink>,
    }

    impl SoundEngine {
        /// None when no audio output device can be opened.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("audio output unavailable: {e}");
                    return None;
                }
            };
            let wavs: Vec<Arc<[u8]>> = CUES.iter()
                .map(|&cue| Arc::from(make_wav(&synthesize(segments(cue)))))
                .collect();
            let music = Arc::from(make_wav(&synthesize(MUSIC)));
            Some(SoundEngine { _stream: stream, handle, wavs, music, music_sink: None })
        }

        /// Loop the background music until the engine is dropped.
        pub fn start_music(&mut self) {
            if self.music_sink.is_some() { return; }
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("no sink for music: {e}");
                    return;
                }
            };
            match Decoder::new(Cursor::new(Arc::clone(&self.music))) {
                Ok(src) => {
                    sink.set_volume(MUSIC_VOLUME);
                    sink.append(src.repeat_infinite());
                    self.music_sink = Some(sink);
                }
                Err(e) => log::warn!("cannot decode music: {e}"),
            }
        }

        pub fn play(&self, cue: AudioCue) {
            let Some(i) = CUES.iter().position(|&c| c == cue) else { return };
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("no sink for {cue:?}: {e}");
                    return;
                }
            };
            match Decoder::new(Cursor::new(Arc::clone(&self.wavs[i]))) {
                Ok(src) => {
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::debug!("cannot decode {cue:?}: {e}"),
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: AudioCue) {}
    pub fn start_music(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AudioCue; 5] = [
        AudioCue::Gold, AudioCue::Dig, AudioCue::Fall, AudioCue::Win, AudioCue::Lose,
    ];

    #[test]
    fn wav_header_and_length() {
        let samples = synthesize(GOLD);
        let wav = make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn every_cue_renders_in_range() {
        for cue in ALL {
            let buf = synthesize(segments(cue));
            assert!(!buf.is_empty(), "{cue:?}");
            assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)), "{cue:?}");
        }
    }

    #[test]
    fn music_loop_renders_quietly_at_the_seam() {
        let buf = synthesize(MUSIC);
        let expected: usize = MUSIC.iter()
            .map(|s| (SAMPLE_RATE as f32 * s.secs) as usize)
            .sum();
        assert_eq!(buf.len(), expected);
        assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
        let last = buf.last().copied().unwrap_or(1.0);
        assert!(last.abs() < 0.05, "seam sample {last}");
        assert!(buf[0].abs() < 0.05, "seam sample {}", buf[0]);
    }

    #[test]
    fn length_follows_segment_durations() {
        let expected = (SAMPLE_RATE as f32 * 0.15) as usize;
        assert_eq!(synthesize(FALL).len(), expected);
    }
}
