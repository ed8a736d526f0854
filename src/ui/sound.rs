/// Sound engine: procedural sound effects via rodio.
///
/// Sounds are synthesized into in-memory WAV buffers and played
/// fire-and-forget through a detached Sink. Any audio failure is silent.
///
/// Compile without the "sound" feature to disable audio entirely (the stub
/// SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;

    use rand::Rng;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        volume: f32,
        sfx_reject: Vec<u8>,
        sfx_empty: Vec<u8>,
    }

    impl SoundEngine {
        pub fn new(volume: f32) -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                volume: volume.clamp(0.0, 1.0),
                sfx_reject: make_wav(&gen_reject()),
                sfx_empty: make_wav(&gen_blip(330.0, 0.03, 0.15)),
            })
        }

        fn play(&self, buf: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf)) {
                    sink.set_volume(self.volume);
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        /// Reward: a handful of coins landing. Pitches vary per play.
        pub fn play_coins(&self) {
            self.play(make_wav(&gen_coins(&mut rand::rng())));
        }

        /// Tile joined the chain; pitch climbs with chain length.
        pub fn play_tile(&self, len: usize) {
            let freq = 400.0 + (len.min(9) as f32) * 70.0;
            self.play(make_wav(&gen_blip(freq, 0.035, 0.2)));
        }

        pub fn play_reject(&self) { self.play(self.sfx_reject.clone()); }
        pub fn play_empty(&self) { self.play(self.sfx_empty.clone()); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Simple sine blip with a linear fade out.
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    fn triangle(phase: f32) -> f32 {
        let x = phase.fract();
        4.0 * (x - 0.5).abs() - 1.0
    }

    /// Three coins, 80 ms apart. Each is a triangle ping near 800 Hz that
    /// sweeps down to 30 % pitch over 0.3 s and decays over 0.4 s, with a
    /// short noise clink on impact. Later coins are quieter.
    fn gen_coins(rng: &mut impl Rng) -> Vec<f32> {
        const COINS: usize = 3;
        const STAGGER: f32 = 0.08;
        const RING: f32 = 0.4;
        const SWEEP: f32 = 0.3;
        const CLINK: f32 = 0.05;

        let total = ((STAGGER * (COINS - 1) as f32 + RING) * SAMPLE_RATE as f32) as usize;
        let mut out = vec![0.0_f32; total];

        for coin in 0..COINS {
            let start = (coin as f32 * STAGGER * SAMPLE_RATE as f32) as usize;
            let f0 = 800.0 + rng.random_range(-100.0..100.0_f32);
            let peak = 0.1 * (1.0 - coin as f32 * 0.2);
            let n = (RING * SAMPLE_RATE as f32) as usize;

            let mut phase = 0.0_f32;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                // Exponential pitch glide f0 → 0.3·f0, then hold.
                let freq = f0 * 0.3_f32.powf((t / SWEEP).min(1.0));
                phase += freq / SAMPLE_RATE as f32;

                // 10 ms linear attack, exponential decay to 0.001.
                let env = if t < 0.01 {
                    peak * t / 0.01
                } else {
                    peak * (0.001 / peak).powf((t - 0.01) / (RING - 0.01))
                };

                let clink = if t < CLINK {
                    let g = 0.3 * (0.001_f32 / 0.3).powf(t / CLINK);
                    rng.random_range(-1.0..1.0_f32) * 0.05 * g
                } else {
                    0.0
                };

                if let Some(s) = out.get_mut(start + i) {
                    *s += triangle(phase) * env + clink;
                }
            }
        }

        // Peak levels above are quiet; scale up for 16-bit PCM.
        for s in &mut out {
            *s *= 2.5;
        }
        out
    }

    /// Rejection: two short low square-ish buzzes.
    fn gen_reject() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[180.0_f32, 140.0] {
            let n = (SAMPLE_RATE as f32 * 0.08) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.5;
                let wave = (t * freq * TAU).sin().signum() * 0.6 + (t * freq * TAU).sin() * 0.4;
                samples.push(wave * env * 0.15);
            }
            samples.extend(std::iter::repeat(0.0).take((SAMPLE_RATE as f32 * 0.02) as usize));
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit mono PCM buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_volume: f32) -> Option<Self> { Some(SoundEngine) }
    pub fn play_coins(&self) {}
    pub fn play_tile(&self, _len: usize) {}
    pub fn play_reject(&self) {}
    pub fn play_empty(&self) {}
}
