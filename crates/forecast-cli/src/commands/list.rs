//! 지원 원자재 목록 출력.

use anyhow::Result;
use forecast_core::{Commodity, Sector};

/// 섹터로 필터링한 카탈로그.
pub fn list_commodities(sector: Option<&str>) -> Result<Vec<&'static Commodity>> {
    match sector {
        Some(s) => {
            let sector: Sector = s.parse()?;
            Ok(Commodity::by_sector(sector))
        }
        None => Ok(Commodity::all().iter().collect()),
    }
}

/// 테이블 형식 출력.
pub fn format_table(commodities: &[&Commodity]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10} {:<28} {:<18} {:<10}\n",
        "TICKER", "NAME", "SEARCH", "SECTOR"
    ));
    output.push_str(&"-".repeat(68));
    output.push('\n');

    for c in commodities {
        output.push_str(&format!(
            "{:<10} {:<28} {:<18} {:<10}\n",
            c.ticker,
            c.name,
            c.english_name,
            c.sector.to_string()
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} commodities", commodities.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_all() {
        let all = list_commodities(None).unwrap();
        assert_eq!(all.len(), Commodity::all().len());
    }

    #[test]
    fn test_list_by_sector() {
        let energy = list_commodities(Some("Energy")).unwrap();
        assert!(!energy.is_empty());
        assert!(energy.iter().all(|c| c.sector == Sector::Energy));
        assert!(list_commodities(Some("crypto")).is_err());
    }

    #[test]
    fn test_format_table() {
        let energy = list_commodities(Some("energy")).unwrap();
        let text = format_table(&energy);
        assert!(text.contains("CL=F"));
        assert!(text.ends_with(&format!("Total: {} commodities", energy.len())));
    }
}
