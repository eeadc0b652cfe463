//! 比较距离变换各调度方式与一维求解方式的耗时与一致性.

mod profile;
mod result;
mod runner;

use std::process::ExitCode;

use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use utils::config::AblationConfig;

fn main() -> ExitCode {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .ok();

    let config = AblationConfig::from_env();
    println!("{config:?}");

    let ans = match runner::run(&config) {
        Ok(ans) => ans,
        Err(e) => {
            error!("ablation failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = ans.analyze() {
        error!("cannot write report: {e}");
        return ExitCode::FAILURE;
    }
    if ans.all_agree(1e-3) {
        ExitCode::SUCCESS
    } else {
        error!("some variants disagree with the reference");
        ExitCode::FAILURE
    }
}
