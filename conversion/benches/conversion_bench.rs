use audioconv::{AudioConversion, SampleFormat, SampleSpec, SliceProvider};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn make_sine_pcm(freq_hz: f64, frames: usize, sample_rate: u32, channels: usize) -> Vec<u8> {
    let mut audio = Vec::with_capacity(frames * channels * 2);
    for i in 0..frames {
        let t = i as f64 / f64::from(sample_rate);
        let sample = (16000.0 * (freq_hz * 2.0 * std::f64::consts::PI * t).sin()) as i16;
        for _ in 0..channels {
            audio.extend_from_slice(&sample.to_le_bytes());
        }
    }
    audio
}

fn configured(src: &SampleSpec, dst: &SampleSpec) -> AudioConversion {
    let mut conversion = AudioConversion::new();
    conversion.configure(src, dst).unwrap();
    conversion
}

fn bench_downmix_widen(c: &mut Criterion) {
    let src = SampleSpec::new(2, SampleFormat::S16, 48000);
    let dst = SampleSpec::new(1, SampleFormat::S8_24, 48000);
    let mut conversion = configured(&src, &dst);
    let audio = make_sine_pcm(440.0, 480, 48000, 2); // 10ms

    c.bench_function("conversion_downmix_widen_10ms", |b| {
        b.iter(|| {
            let _ = black_box(conversion.convert(black_box(&audio), 480));
        });
    });
}

fn bench_resample_44k_to_48k(c: &mut Criterion) {
    let src = SampleSpec::new(2, SampleFormat::S16, 44100);
    let dst = SampleSpec::new(2, SampleFormat::S16, 48000);
    let mut conversion = configured(&src, &dst);
    let audio = make_sine_pcm(440.0, 441, 44100, 2); // 10ms

    c.bench_function("conversion_resample_44k_48k_10ms", |b| {
        b.iter(|| {
            let _ = black_box(conversion.convert(black_box(&audio), 441));
        });
    });
}

fn bench_full_chain(c: &mut Criterion) {
    let src = SampleSpec::new(2, SampleFormat::S8_24, 16000);
    let dst = SampleSpec::new(1, SampleFormat::S16, 48000);
    let mut conversion = configured(&src, &dst);
    let audio = vec![0u8; src.frames_to_bytes(160)]; // 10ms

    c.bench_function("conversion_full_chain_10ms", |b| {
        b.iter(|| {
            let _ = black_box(conversion.convert(black_box(&audio), 160));
        });
    });
}

fn bench_pull_1s(c: &mut Criterion) {
    let src = SampleSpec::new(1, SampleFormat::S16, 16000);
    let dst = SampleSpec::new(1, SampleFormat::S16, 48000);
    let audio = make_sine_pcm(440.0, 16000 + 1024, 16000, 1);
    let mut out = vec![0u8; dst.frames_to_bytes(480)];

    c.bench_function("conversion_pull_16k_48k_1s", |b| {
        b.iter(|| {
            let mut conversion = configured(&src, &dst);
            let mut provider = SliceProvider::new(&audio, src.frame_size());
            for _ in 0..100 {
                conversion.get_converted_buffer(&mut out, 480, &mut provider).unwrap();
            }
            black_box(&out);
        });
    });
}

criterion_group!(
    benches,
    bench_downmix_widen,
    bench_resample_44k_to_48k,
    bench_full_chain,
    bench_pull_1s,
);
criterion_main!(benches);
