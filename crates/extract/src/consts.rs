use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

// The category marker is a `span.genre` that pops up a hover card; plain
// genre tags on the same page carry no `onmouseover` handler.
selector!(MARKER_SELECTOR, "span.genre[onmouseover*='hoverdiv']");
selector!(ANCHOR_SELECTOR, "a");
