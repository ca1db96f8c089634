use barcode_bridge_settings::DEFAULT_PRICE_LIST;

/// How display prices are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceMode {
    /// Latest selling price on the price list, then standard rate, then zero.
    #[default]
    PriceList,
    /// Standard rate, then zero. Price lists are not consulted.
    StandardRate,
}

/// Resolver settings supplied by the caller at construction time.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Price list used when neither the request nor stored settings name one.
    pub default_price_list: String,
    /// Price resolution strategy.
    pub price_mode: PriceMode,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_price_list: DEFAULT_PRICE_LIST.to_owned(),
            price_mode: PriceMode::default(),
        }
    }
}

impl ResolverConfig {
    /// Replace the fallback price list.
    pub fn with_price_list(mut self, price_list: impl Into<String>) -> Self {
        self.default_price_list = price_list.into();
        self
    }

    /// Replace the price mode.
    pub fn with_price_mode(mut self, mode: PriceMode) -> Self {
        self.price_mode = mode;
        self
    }
}
