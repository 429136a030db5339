use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::RatingError;

/// Implied win probability of an American moneyline, vig included.
pub fn implied_probability(moneyline: i32) -> Result<f64, RatingError> {
    if moneyline.unsigned_abs() < 100 {
        return Err(RatingError::InvalidMoneyline(moneyline));
    }
    let ml = f64::from(moneyline);
    Ok(if ml > 0.0 {
        100.0 / (ml + 100.0)
    } else {
        -ml / (-ml + 100.0)
    })
}

/// Home and visitor probabilities with the bookmaker margin removed.
pub fn no_vig_pair(home_mline: i32, vis_mline: i32) -> Result<(f64, f64), RatingError> {
    let ih = implied_probability(home_mline)?;
    let iv = implied_probability(vis_mline)?;
    let sum = ih + iv;
    Ok((ih / sum, iv / sum))
}

/// Book margin: how far the raw implied probabilities exceed 1.
pub fn overround(home_mline: i32, vis_mline: i32) -> Result<f64, RatingError> {
    Ok(implied_probability(home_mline)? + implied_probability(vis_mline)? - 1.0)
}

/// One tracked line, as written by the line tracker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketLine {
    pub home: String,
    pub vis: String,
    pub home_mline: i32,
    pub vis_mline: i32,
}

impl MarketLine {
    pub fn home_probability(&self) -> Result<f64, RatingError> {
        no_vig_pair(self.home_mline, self.vis_mline).map(|(home, _)| home)
    }
}

/// Reads tracked lines. Rows without both moneylines are skipped.
pub fn read_lines_csv<R: Read>(reader: R) -> Result<Vec<MarketLine>> {
    #[derive(Deserialize)]
    struct Row {
        home: String,
        vis: String,
        home_mline: Option<i32>,
        vis_mline: Option<i32>,
    }

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<Row>().enumerate() {
        let row = row.with_context(|| format!("invalid line row {}", idx + 1))?;
        let (Some(home_mline), Some(vis_mline)) = (row.home_mline, row.vis_mline) else {
            continue;
        };
        out.push(MarketLine {
            home: row.home,
            vis: row.vis,
            home_mline,
            vis_mline,
        });
    }
    Ok(out)
}

pub fn load_lines(path: &Path) -> Result<Vec<MarketLine>> {
    let file = File::open(path).with_context(|| format!("open lines {}", path.display()))?;
    read_lines_csv(file).with_context(|| format!("read lines {}", path.display()))
}
