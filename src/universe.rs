// =============================================================================
// Tracked universe — NIFTY 50 constituents with sector tags
// =============================================================================
//
// The universe is configuration, not runtime state: a static ordered list of
// (symbol, sector) pairs. Response ordering follows this list.

/// One tracked instrument.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UniverseEntry {
    pub symbol: String,
    pub sector: String,
}

impl UniverseEntry {
    pub fn new(symbol: &str, sector: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            sector: sector.to_string(),
        }
    }
}

/// The default NIFTY 50 universe, in index weighting order.
pub fn default_universe() -> Vec<UniverseEntry> {
    [
        ("RELIANCE", "Energy"),
        ("TCS", "IT"),
        ("HDFCBANK", "Banking"),
        ("INFY", "IT"),
        ("ICICIBANK", "Banking"),
        ("HINDUNILVR", "FMCG"),
        ("SBIN", "Banking"),
        ("BHARTIARTL", "Telecom"),
        ("ITC", "FMCG"),
        ("KOTAKBANK", "Banking"),
        ("LT", "Infra"),
        ("AXISBANK", "Banking"),
        ("ASIANPAINT", "Paints"),
        ("MARUTI", "Auto"),
        ("WIPRO", "IT"),
        ("SUNPHARMA", "Pharma"),
        ("TITAN", "Consumer"),
        ("BAJFINANCE", "NBFC"),
        ("POWERGRID", "Power"),
        ("NTPC", "Power"),
        ("TATASTEEL", "Metal"),
        ("JSWSTEEL", "Metal"),
        ("ADANIPORTS", "Port"),
        ("HCLTECH", "IT"),
        ("ULTRACEMCO", "Cement"),
        ("NESTLEIND", "FMCG"),
        ("TATAMOTORS", "Auto"),
        ("M&M", "Auto"),
        ("ONGC", "Energy"),
        ("COALINDIA", "Mining"),
        ("BPCL", "Energy"),
        ("GRASIM", "Conglomerate"),
        ("TECHM", "IT"),
        ("INDUSINDBK", "Banking"),
        ("EICHERMOT", "Auto"),
        ("DRREDDY", "Pharma"),
        ("CIPLA", "Pharma"),
        ("DIVISLAB", "Pharma"),
        ("BAJAJFINSV", "NBFC"),
        ("TATACONSUM", "FMCG"),
        ("APOLLOHOSP", "Healthcare"),
        ("BRITANNIA", "FMCG"),
        ("HEROMOTOCO", "Auto"),
        ("HINDALCO", "Metal"),
        ("SBILIFE", "Insurance"),
        ("HDFCLIFE", "Insurance"),
        ("UPL", "Agro"),
        ("SHRIRAMFIN", "NBFC"),
        ("BEL", "Defence"),
        ("TRENT", "Retail"),
    ]
    .iter()
    .map(|(s, sec)| UniverseEntry::new(s, sec))
    .collect()
}
