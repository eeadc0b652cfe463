//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    #[inline]
    fn u64_to_display(u: Option<u64>) -> String {
        match u {
            Some(u) => u.to_string(),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Successful runs: {}", p.get_runs())?;
    writeln!(w, "{S4}Failed runs: {}", p.get_failed())?;
    writeln!(w, "{S4}Total time: {} us", p.get_run_time_us())?;
    writeln!(
        w,
        "{S4}Average time: {} us",
        f64_to_display(p.get_avg_run_time_us())
    )?;
    writeln!(
        w,
        "{S4}Throughput: {} voxels per us",
        f64_to_display(p.get_throughput())
    )?;
    writeln!(w, "{S4}Max error vs. reference: {:e}", p.get_max_error())?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros() as u64);
    write!(w, "{S4}Most time-consuming run costs {} us", u64_to_display(t))?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(String, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (String, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 是否所有变体都与参考结果一致 (误差不超过 `tol`) 且没有失败?
    pub fn all_agree(&self, tol: f32) -> bool {
        self.data
            .iter()
            .all(|(_, p)| p.get_failed() == 0 && p.get_max_error() <= tol)
    }

    /// 输出运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        utils::sep_to(&mut out)?;
        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut out)?;
            writeln!(out)?;
            utils::sep_to(&mut out)?;
        }
        Ok(())
    }
}
