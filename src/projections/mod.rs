//! Derived WEO projection series for one country.
//!
//! Every series is direct arithmetic on raw WEO subject codes. A missing raw
//! field aborts the whole computation; there is no partial output.

use serde::Serialize;

use crate::data::weo::CountryRecord;
use crate::domain::YearSeries;
use crate::error::AppError;

/// Derived projection series, in grid order (row-major, 3 columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProjectionKind {
    Gdp,
    Cpi,
    CurrentAccount,
    Fx,
    Deficit,
    GrossDebt,
    NetDebt,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 7] = [
        ProjectionKind::Gdp,
        ProjectionKind::Cpi,
        ProjectionKind::CurrentAccount,
        ProjectionKind::Fx,
        ProjectionKind::Deficit,
        ProjectionKind::GrossDebt,
        ProjectionKind::NetDebt,
    ];

    /// Short column key, as used in tables and exports.
    pub fn key(self) -> &'static str {
        match self {
            ProjectionKind::Gdp => "GDP",
            ProjectionKind::Cpi => "CPI",
            ProjectionKind::CurrentAccount => "CA",
            ProjectionKind::Fx => "FX",
            ProjectionKind::Deficit => "DEFICIT",
            ProjectionKind::GrossDebt => "GDEBT",
            ProjectionKind::NetDebt => "NDEBT",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ProjectionKind::Gdp => "Real GDP index",
            ProjectionKind::Cpi => "CPI inflation",
            ProjectionKind::CurrentAccount => "Current account (% GDP)",
            ProjectionKind::Fx => "Exchange rate (LCU/USD)",
            ProjectionKind::Deficit => "Fiscal balance (% GDP)",
            ProjectionKind::GrossDebt => "Gross public debt (% GDP)",
            ProjectionKind::NetDebt => "Net public debt (% GDP)",
        }
    }

    /// Fixed RGB colour per series.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            ProjectionKind::Gdp => (0x63, 0x6E, 0xFA),
            ProjectionKind::Cpi => (0x00, 0xCC, 0x96),
            ProjectionKind::CurrentAccount => (0xFF, 0xA1, 0x5A),
            ProjectionKind::Fx => (0xAB, 0x63, 0xFA),
            ProjectionKind::Deficit => (0x19, 0xD3, 0xF3),
            ProjectionKind::GrossDebt => (0xFF, 0x66, 0x92),
            ProjectionKind::NetDebt => (0xB6, 0xE8, 0x80),
        }
    }

    /// `(row, col)` in the 3x3 grid, zero-based.
    pub fn grid_cell(self) -> (usize, usize) {
        let idx = ProjectionKind::ALL
            .iter()
            .position(|k| *k == self)
            .unwrap_or(0);
        (idx / GRID_COLS, idx % GRID_COLS)
    }
}

pub const GRID_ROWS: usize = 3;
pub const GRID_COLS: usize = 3;

/// All derived series for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    pub country: String,
    pub iso: String,
    series: Vec<(ProjectionKind, YearSeries)>,
}

impl Projections {
    pub fn get(&self, kind: ProjectionKind) -> &YearSeries {
        self.series
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s)
            .unwrap_or(&EMPTY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProjectionKind, &YearSeries)> {
        self.series.iter().map(|(k, s)| (*k, s))
    }

    /// Union of all periods, ascending.
    pub fn periods(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.series.iter().flat_map(|(_, s)| s.years()).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Row-major table: one row per period, one cell per kind in `ProjectionKind::ALL` order.
    pub fn table(&self) -> Vec<(i32, Vec<Option<f64>>)> {
        self.periods()
            .into_iter()
            .map(|year| {
                let row = ProjectionKind::ALL
                    .iter()
                    .map(|&k| self.get(k).get(year))
                    .collect();
                (year, row)
            })
            .collect()
    }
}

static EMPTY: YearSeries = YearSeries::empty();

/// Compute every derived series from a country's raw WEO fields.
pub fn compute(record: &CountryRecord) -> Result<Projections, AppError> {
    let real_growth = record.field("NGDP_RPCH")?;
    let cpi = record.field("PCPIPCH")?;
    let ngdp = record.field("NGDP")?;
    let ngdpd = record.field("NGDPD")?;
    let revenue = record.field("GGR")?;
    let expenditure = record.field("GGX")?;
    let current_account = record.field("BCA")?;
    let gross_debt = record.field("GGXWDG")?;
    let net_debt = record.field("GGXWDN")?;

    let pct_of = |num: &YearSeries, den: &YearSeries| num.zip_with(den, |a, b| a / b * 100.0);

    let series = vec![
        (ProjectionKind::Gdp, real_growth.growth_index(100.0)),
        (ProjectionKind::Cpi, cpi.clone()),
        (ProjectionKind::CurrentAccount, pct_of(current_account, ngdpd)),
        (ProjectionKind::Fx, ngdp.zip_with(ngdpd, |a, b| a / b)),
        (
            ProjectionKind::Deficit,
            pct_of(&revenue.zip_with(expenditure, |r, x| r - x), ngdp),
        ),
        (ProjectionKind::GrossDebt, pct_of(gross_debt, ngdp)),
        (ProjectionKind::NetDebt, pct_of(net_debt, ngdp)),
    ];

    Ok(Projections {
        country: record.name.clone(),
        iso: record.iso.clone(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::weo::WeoDataset;

    const TABLE: &str = "ISO\tWEO Subject Code\tCountry\t2023\t2024\t2025\n\
        FRA\tNGDP_RPCH\tFrance\t1.0\t2.0\tn/a\n\
        FRA\tPCPIPCH\tFrance\t5.7\t2.3\t1.6\n\
        FRA\tNGDP\tFrance\t2800\t2900\t3000\n\
        FRA\tNGDPD\tFrance\t3000\t3100\t3200\n\
        FRA\tGGR\tFrance\t1400\t1450\t1500\n\
        FRA\tGGX\tFrance\t1540\t1610\t1650\n\
        FRA\tBCA\tFrance\t-30\t-15\t0\n\
        FRA\tGGXWDG\tFrance\t3080\t3190\t3300\n\
        FRA\tGGXWDN\tFrance\t2800\t2900\t\n\
        ITA\tNGDP_RPCH\tItaly\t0.9\t0.7\t0.8\n";

    fn france() -> CountryRecord {
        WeoDataset::parse(TABLE).unwrap().country("FRA").unwrap()
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn derived_series_match_hand_computation() {
        let p = compute(&france()).unwrap();

        let gdp = p.get(ProjectionKind::Gdp);
        assert!(close(gdp.get(2023), 101.0));
        assert!(close(gdp.get(2024), 101.0 * 1.02));
        assert_eq!(gdp.get(2025), None);

        assert!(close(p.get(ProjectionKind::Cpi).get(2023), 5.7));
        assert!(close(p.get(ProjectionKind::Fx).get(2024), 2900.0 / 3100.0));
        assert!(close(p.get(ProjectionKind::Deficit).get(2023), -5.0));
        assert!(close(p.get(ProjectionKind::CurrentAccount).get(2023), -1.0));
        assert!(close(p.get(ProjectionKind::GrossDebt).get(2023), 110.0));
        assert!(close(p.get(ProjectionKind::NetDebt).get(2023), 100.0));
        assert_eq!(p.get(ProjectionKind::NetDebt).get(2025), None);
    }

    #[test]
    fn missing_raw_field_aborts() {
        let italy = WeoDataset::parse(TABLE).unwrap().country("ITA").unwrap();
        let err = compute(&italy).unwrap_err();
        assert!(err.to_string().contains("PCPIPCH"));
    }

    #[test]
    fn table_covers_union_of_periods() {
        let p = compute(&france()).unwrap();
        let table = p.table();
        assert_eq!(table.iter().map(|(y, _)| *y).collect::<Vec<_>>(), vec![2023, 2024, 2025]);
        assert_eq!(table[0].1.len(), ProjectionKind::ALL.len());
    }

    #[test]
    fn grid_layout_is_row_major() {
        assert_eq!(ProjectionKind::Gdp.grid_cell(), (0, 0));
        assert_eq!(ProjectionKind::CurrentAccount.grid_cell(), (0, 2));
        assert_eq!(ProjectionKind::Fx.grid_cell(), (1, 0));
        assert_eq!(ProjectionKind::NetDebt.grid_cell(), (2, 0));
    }
}
