//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use edt_berry::prelude::*;
use log::{info, warn};
use utils::config::AblationConfig;
use utils::phantom;

/// 参与比较的变体. 第一个为参考.
fn variants(threads: usize) -> Vec<(&'static str, Schedule, LineMinimizer)> {
    let mut ans = vec![
        ("direct/round-robin", Schedule::RoundRobin(threads), LineMinimizer::Direct),
        ("envelope/round-robin", Schedule::RoundRobin(threads), LineMinimizer::Envelope),
        ("direct/single", Schedule::RoundRobin(1), LineMinimizer::Direct),
    ];
    #[cfg(feature = "rayon")]
    ans.extend([
        ("direct/rayon", Schedule::Rayon(threads), LineMinimizer::Direct),
        ("envelope/rayon", Schedule::Rayon(threads), LineMinimizer::Envelope),
    ]);
    ans
}

/// 参与比较的合成体积.
fn phantoms(size: usize) -> Vec<(&'static str, GrayVolume)> {
    vec![
        ("ball", phantom::ball(size, size as f64 * 0.4)),
        ("hollow-box", phantom::hollow_box(size)),
        ("single-seed", phantom::single_seed(size)),
        ("noise", phantom::noise(size, 50, 0x5eed)),
    ]
}

/// 两个距离场的最大绝对误差.
fn max_abs_diff(a: &DistanceField, b: &DistanceField) -> f32 {
    a.data()
        .iter()
        .zip(b.data().iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

/// 实际运行.
pub fn run(config: &AblationConfig) -> EdtResult<AblationResult> {
    let spacing = VoxelSpacing::new(0.8, 0.8, 2.5)?;
    let variants = variants(config.threads);
    let mut profiles: Vec<Profile> = variants.iter().map(|_| Profile::new()).collect();

    println!("Running ablation studies...");
    for (name, volume) in phantoms(config.size) {
        info!("phantom `{name}`, shape {:?}", volume.shape());

        let base = EdtParams::default().with_spacing(spacing);
        let reference = transform(&volume, &base)?;

        for ((label, schedule, minimizer), profile) in variants.iter().zip(profiles.iter_mut()) {
            let edt = Edt::new(&base.with_schedule(*schedule).with_minimizer(*minimizer))?;
            for _ in 0..config.rounds {
                profile.run_start();
                match edt.run(&volume) {
                    Ok(field) => {
                        profile.run_elapsed(volume.size());
                        profile.record_error(max_abs_diff(&field, &reference));
                    }
                    Err(e) => {
                        warn!("{label} on `{name}` failed: {e}");
                        profile.count_failed();
                    }
                }
            }
        }
    }

    Ok(AblationResult::from_iter(
        variants
            .into_iter()
            .map(|(label, _, _)| label.to_string())
            .zip(profiles),
    ))
}
