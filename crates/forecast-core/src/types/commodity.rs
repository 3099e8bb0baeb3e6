//! 지원 원자재 카탈로그.
//!
//! Yahoo Finance 선물 티커와 표시 이름(포르투갈어), 뉴스 검색용 영문 키워드,
//! 섹터를 매핑합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 원자재 섹터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    /// 금속
    Metals,
    /// 에너지
    Energy,
    /// 곡물
    Grains,
    /// 축산
    Livestock,
    /// 소프트 원자재
    Softs,
    /// 기타 (지수 선물 등)
    Other,
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::Metals => write!(f, "metals"),
            Sector::Energy => write!(f, "energy"),
            Sector::Grains => write!(f, "grains"),
            Sector::Livestock => write!(f, "livestock"),
            Sector::Softs => write!(f, "softs"),
            Sector::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Sector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metals" => Ok(Sector::Metals),
            "energy" => Ok(Sector::Energy),
            "grains" => Ok(Sector::Grains),
            "livestock" => Ok(Sector::Livestock),
            "softs" => Ok(Sector::Softs),
            "other" => Ok(Sector::Other),
            _ => Err(CoreError::InvalidInput(format!("알 수 없는 섹터: {}", s))),
        }
    }
}

/// 원자재 선물 정보.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Commodity {
    /// Yahoo Finance 티커 (예: "KC=F")
    pub ticker: &'static str,
    /// 표시 이름
    pub name: &'static str,
    /// 영문 검색 키워드
    pub english_name: &'static str,
    /// 섹터
    pub sector: Sector,
}

const fn commodity(
    ticker: &'static str,
    name: &'static str,
    english_name: &'static str,
    sector: Sector,
) -> Commodity {
    Commodity {
        ticker,
        name,
        english_name,
        sector,
    }
}

static CATALOG: &[Commodity] = &[
    // 금속
    commodity("GC=F", "Ouro", "gold", Sector::Metals),
    commodity("SI=F", "Prata", "silver", Sector::Metals),
    commodity("PL=F", "Platina", "platinum", Sector::Metals),
    commodity("PA=F", "Paládio", "palladium", Sector::Metals),
    commodity("HG=F", "Cobre", "copper", Sector::Metals),
    // 에너지
    commodity("CL=F", "Petróleo WTI", "WTI oil", Sector::Energy),
    commodity("BZ=F", "Petróleo Brent", "Brent oil", Sector::Energy),
    commodity("NG=F", "Gás Natural", "natural gas", Sector::Energy),
    commodity("RB=F", "Gasolina RBOB", "gasoline", Sector::Energy),
    commodity("HO=F", "Óleo de Aquecimento", "heating oil", Sector::Energy),
    // 곡물
    commodity("ZC=F", "Milho", "corn", Sector::Grains),
    commodity("ZS=F", "Soja", "soybean", Sector::Grains),
    commodity("ZW=F", "Trigo", "wheat", Sector::Grains),
    commodity("KE=F", "Trigo Vermelho", "red wheat", Sector::Grains),
    commodity("ZM=F", "Farelo de Soja", "soybean meal", Sector::Grains),
    commodity("ZL=F", "Óleo de Soja", "soybean oil", Sector::Grains),
    commodity("ZO=F", "Aveia", "oats", Sector::Grains),
    // 축산
    commodity("LE=F", "Gado Vivo", "live cattle", Sector::Livestock),
    commodity("HE=F", "Carne de Porco", "lean hogs", Sector::Livestock),
    commodity("GF=F", "Gado de Corte", "feeder cattle", Sector::Livestock),
    // 소프트
    commodity("SB=F", "Açúcar", "sugar", Sector::Softs),
    commodity("CC=F", "Cacau", "cocoa", Sector::Softs),
    commodity("KC=F", "Café Arábica", "coffee", Sector::Softs),
    commodity("CT=F", "Algodão", "cotton", Sector::Softs),
    commodity("OJ=F", "Suco de Laranja", "orange juice", Sector::Softs),
    commodity("LBS=F", "Madeira", "lumber", Sector::Softs),
    // 기타
    commodity("DX=F", "Índice Dólar", "dollar index", Sector::Other),
    commodity("ES=F", "S&P 500 Futuros", "S&P 500 futures", Sector::Other),
    commodity("NQ=F", "Nasdaq 100 Futuros", "Nasdaq 100 futures", Sector::Other),
];

impl Commodity {
    /// 전체 카탈로그.
    pub fn all() -> &'static [Commodity] {
        CATALOG
    }

    /// 티커로 조회 (대소문자 무시).
    pub fn by_ticker(ticker: &str) -> Option<&'static Commodity> {
        let ticker = ticker.trim();
        CATALOG.iter().find(|c| c.ticker.eq_ignore_ascii_case(ticker))
    }

    /// 표시 이름으로 조회.
    pub fn by_name(name: &str) -> Option<&'static Commodity> {
        CATALOG.iter().find(|c| c.name == name)
    }

    /// 섹터별 목록.
    pub fn by_sector(sector: Sector) -> Vec<&'static Commodity> {
        CATALOG.iter().filter(|c| c.sector == sector).collect()
    }

    /// 티커의 표시 이름. 카탈로그에 없으면 티커 그대로 반환.
    pub fn display_name(ticker: &str) -> String {
        Self::by_ticker(ticker)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| ticker.to_string())
    }
}
