//! Observation value objects produced while reading legacy visits

use crate::domain::codes::TbScreenCode;
use crate::domain::target::{ConceptRef, Obs, ObsValue};
use chrono::NaiveDate;

/// Legacy TB screening result taken at a visit
///
/// Lives only until it is folded into a target encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TbScreenObs {
    date: NaiveDate,
    code: TbScreenCode,
}

impl TbScreenObs {
    pub fn new(date: NaiveDate, code: TbScreenCode) -> Self {
        Self { date, code }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn code(&self) -> TbScreenCode {
        self.code
    }

    /// Converts into a coded target observation
    pub fn into_obs(self) -> Obs {
        Obs {
            concept: ConceptRef::parse(TbScreenCode::MAPPED_QUESTION),
            obs_date: self.date,
            value: ObsValue::Coded(ConceptRef::parse(self.code.mapped_answer())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tb_screen_obs_into_obs() {
        let date = NaiveDate::from_ymd_opt(2011, 6, 1).unwrap();
        let obs = TbScreenObs::new(date, TbScreenCode::Positive).into_obs();

        assert_eq!(obs.concept, ConceptRef::Name("TUBERCULOSIS SCREENING".to_string()));
        assert_eq!(obs.obs_date, date);
        assert_eq!(
            obs.value,
            ObsValue::Coded(ConceptRef::Name("POSITIVE".to_string()))
        );
    }
}
