//! City Electric Supply wire and cable catalog.
//!
//! Walks each category listing page by page, reads the product cards, then
//! batches one price lookup and one inventory lookup per category.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};
use url::Url;

use crate::config::{SENTINEL_NA, SENTINEL_NO_TITLE, SENTINEL_NO_URL};
use crate::error_handling::{ProcessingStats, WarningType};
use crate::fetch::Session;
use crate::parse::{
    attr, attr_or_blank, decode_json, element_text, json_field, json_key_text, or_sentinel,
    parse_selector_with_fallback, resolve_href, select_links,
};
use crate::record::{Accumulator, FieldValue, Record, RunContext};

use super::constant_url;

pub const JOB_NAME: &str = "City Electric Supply Products";
pub const OUTPUT_DIR: &str = "16744-City Electric Supply Products";
pub const COLUMNS: &[&str] = &[
    "scrape_datetime",
    "base_url",
    "category",
    "product_url",
    "product_name",
    "catalog_code",
    "stock_code",
    "availability",
    "buying_option",
    "price",
];

const DEFAULT_ORIGIN: &str = "https://www.cityelectricsupply.com";
const CATEGORY_PATHS: &[&str] = &[
    "/tffn-building-wire",
    "/thhn-wire",
    "/nm-b-wire",
    "/aluminum-armor",
    "/urd",
    "/ser-aluminum",
    "/wire-cord-cable",
];
const PRICE_PATH: &str = "/product/lazyprice";
const INVENTORY_PATH: &str = "/product/lazyinventory";

const SENTINEL_NO_STOCK_CODE: &str = "No Stock Code";
const SENTINEL_NO_CATALOG_CODE: &str = "No Catalog Code";
const SENTINEL_NO_CATEGORY: &str = "No Category";

const SUBCATEGORY_LINKS: &str = ".sub-category-item a";
const NESTED_SUBCATEGORY_LINKS: &str =
    ".category-grid.sub-category-grid .item-box .sub-category-item h2.title a";
const NEXT_PAGE_LINK: &str = ".next-page a";

static PRODUCT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("div.product-item", "product cards"));
static PRODUCT_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("a.search-page-product", "product link"));
static DESCRIPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("div.description", "product description"));
static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("li", "description items"));
static IMPRESSION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("input#impression", "product impression"));

/// How a category reaches its product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Descent {
    /// The category page itself is the first listing page.
    Direct,
    /// Listings live one subcategory level down.
    Subcategories,
    /// Listings live two subcategory levels down.
    NestedSubcategories,
}

fn descent_for(path: &str) -> Descent {
    match path.trim_end_matches('/') {
        "/thhn-wire" => Descent::Subcategories,
        "/wire-cord-cable" => Descent::NestedSubcategories,
        _ => Descent::Direct,
    }
}

/// One product card read from a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    /// Inventory-management id; the key for price lookups and deduplication.
    pub ims_id: String,
    /// SKU for the inventory lookup, when the card carries one.
    pub stock_code: Option<String>,
    pub category: FieldValue,
    pub product_url: FieldValue,
    pub product_name: FieldValue,
    pub catalog_code: FieldValue,
    pub buying_option: String,
}

impl ProductCard {
    fn into_record(
        self,
        base_url: &str,
        prices: &HashMap<String, FieldValue>,
        availability: &HashMap<String, String>,
        ctx: &RunContext,
    ) -> Record {
        let available = self
            .stock_code
            .as_ref()
            .and_then(|sku| availability.get(sku))
            .map_or_else(|| FieldValue::from(SENTINEL_NA), |a| FieldValue::from(a.as_str()));
        let price = prices
            .get(&self.ims_id)
            .cloned()
            .unwrap_or_else(|| FieldValue::from(SENTINEL_NA));
        let stock_code = self
            .stock_code
            .unwrap_or_else(|| SENTINEL_NO_STOCK_CODE.to_string());

        ctx.record()
            .with("base_url", base_url)
            .with("category", self.category)
            .with("product_url", self.product_url)
            .with("product_name", self.product_name)
            .with("catalog_code", self.catalog_code)
            .with("stock_code", stock_code)
            .with("availability", available)
            .with("buying_option", self.buying_option)
            .with("price", price)
    }
}

/// Products of one category, keyed by ims id in first-seen order.
///
/// A later card with the same ims id replaces the earlier one in place.
#[derive(Debug, Default)]
struct ProductIndex {
    cards: Vec<ProductCard>,
    positions: HashMap<String, usize>,
}

impl ProductIndex {
    fn insert(&mut self, card: ProductCard) {
        match self.positions.get(&card.ims_id) {
            Some(&i) => self.cards[i] = card,
            None => {
                self.positions.insert(card.ims_id.clone(), self.cards.len());
                self.cards.push(card);
            }
        }
    }

    fn ims_ids(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.ims_id.as_str()).collect()
    }

    fn skus(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.cards
            .iter()
            .filter_map(|c| c.stock_code.as_deref())
            .filter(|sku| !sku.is_empty() && seen.insert(*sku))
            .collect()
    }

    fn len(&self) -> usize {
        self.cards.len()
    }

    fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Reads one product card. `None` when the card has no usable impression data.
fn parse_card(product: ElementRef<'_>, origin: &Url, stats: &ProcessingStats) -> Option<ProductCard> {
    let impression = product
        .select(&IMPRESSION_SELECTOR)
        .next()
        .and_then(|input| input.value().attr("value"))?;
    let data: Value = match serde_json::from_str(impression) {
        Ok(data) => data,
        Err(e) => {
            log::debug!("Skipping product with unreadable impression data: {e}");
            stats.increment_warning(WarningType::ItemSkipped);
            return None;
        }
    };
    let Some(ims_id) = json_key_text(&data, "Id").filter(|id| !id.is_empty()) else {
        stats.increment_warning(WarningType::ItemSkipped);
        return None;
    };

    let link = product.select(&PRODUCT_LINK_SELECTOR).next();
    let product_url = link
        .as_ref()
        .and_then(|a| attr(a, "href"))
        .and_then(|href| resolve_href(origin, &href));
    let product_name = link.as_ref().and_then(|a| attr_or_blank(a, "title"));

    let buying_option = product
        .select(&DESCRIPTION_SELECTOR)
        .next()
        .map(|description| {
            description
                .select(&LIST_ITEM_SELECTOR)
                .map(|li| element_text(&li))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    Some(ProductCard {
        ims_id,
        stock_code: attr_or_blank(&product, "data-productsku"),
        category: or_sentinel(json_field(&data, "Category3"), SENTINEL_NO_CATEGORY, stats),
        product_url: or_sentinel(product_url, SENTINEL_NO_URL, stats),
        product_name: or_sentinel(product_name, SENTINEL_NO_TITLE, stats),
        catalog_code: or_sentinel(
            json_field(&data, "ManufacturerPartNumber"),
            SENTINEL_NO_CATALOG_CODE,
            stats,
        ),
        buying_option,
    })
}

/// Product cards on one listing page, in document order.
///
/// A page without product cards yields an empty list.
pub fn parse_product_cards(document: &Html, origin: &Url, stats: &ProcessingStats) -> Vec<ProductCard> {
    document
        .select(&PRODUCT_SELECTOR)
        .filter_map(|product| parse_card(product, origin, stats))
        .collect()
}

/// Absolute URL of the next listing page, if the page links one.
pub fn next_page_url(document: &Html, origin: &Url) -> Option<String> {
    select_links(document, NEXT_PAGE_LINK, origin).into_iter().next()
}

/// `ImsId` to `DisplayPrice` from a lazy-price response.
pub fn parse_prices(data: &Value) -> HashMap<String, FieldValue> {
    data.as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let ims_id = json_key_text(item, "ImsId").filter(|id| !id.is_empty())?;
            let price = json_field(item, "DisplayPrice").unwrap_or_else(|| SENTINEL_NA.into());
            Some((ims_id, price))
        })
        .collect()
}

/// `Sku` to an availability label from a lazy-inventory response.
///
/// The quantity is the first location's stock when the item lists locations,
/// else the item's `Total`, else 0.
pub fn parse_availability(data: &Value) -> HashMap<String, String> {
    data.as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let sku = json_key_text(item, "Sku")?;
            let quantity = match item.pointer("/Overview/LocationStocks/0") {
                Some(location) => location.get("Quantity"),
                None => item.get("Total"),
            }
            .map(|q| FieldValue::from(q).render())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| "0".to_string());
            Some((sku, format!("Available: ({quantity} Feet)")))
        })
        .collect()
}

/// Scraper for the City Electric Supply catalog.
#[derive(Debug, Clone)]
pub struct CesProducts {
    origin: Url,
    category_paths: Vec<String>,
}

impl Default for CesProducts {
    fn default() -> Self {
        Self::with_origin(constant_url(DEFAULT_ORIGIN))
    }
}

impl CesProducts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scraper rooted at `origin` instead of the live storefront.
    pub fn with_origin(origin: Url) -> Self {
        Self {
            origin,
            category_paths: CATEGORY_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Restricts the run to the given category paths.
    pub fn with_categories(mut self, paths: &[&str]) -> Self {
        self.category_paths = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        resolve_href(&self.origin, path).unwrap_or_else(|| format!("{}{}", self.origin, path))
    }

    /// Scrapes every configured category.
    pub async fn scrape(&self, session: &Session, ctx: &RunContext) -> Accumulator {
        let stats = session.stats();
        let mut accumulator = Accumulator::new();

        for path in &self.category_paths {
            let base_url = self.endpoint(path);
            let mut products = ProductIndex::default();

            match descent_for(path) {
                Descent::Direct => self.paginate(session, &base_url, &mut products).await,
                Descent::Subcategories => {
                    let listings = self.links_on(session, &base_url, SUBCATEGORY_LINKS).await;
                    self.scrape_listings(session, &base_url, listings, &mut products)
                        .await;
                }
                Descent::NestedSubcategories => {
                    let mut listings = Vec::new();
                    for sub_url in self.links_on(session, &base_url, SUBCATEGORY_LINKS).await {
                        listings.extend(
                            self.links_on(session, &sub_url, NESTED_SUBCATEGORY_LINKS)
                                .await,
                        );
                    }
                    self.scrape_listings(session, &base_url, listings, &mut products)
                        .await;
                }
            }

            if products.is_empty() {
                log::warn!("No products found under {base_url}");
                stats.increment_warning(WarningType::EmptyResult);
                continue;
            }
            log::info!("Found {} products under {}", products.len(), base_url);

            let prices = self.fetch_prices(session, &products.ims_ids()).await;
            let availability = self.fetch_availability(session, &products.skus()).await;

            accumulator.extend(
                products
                    .cards
                    .into_iter()
                    .map(|card| card.into_record(&base_url, &prices, &availability, ctx)),
            );
        }

        accumulator
    }

    /// Paginates each listing; falls back to the category page when there are none.
    async fn scrape_listings(
        &self,
        session: &Session,
        base_url: &str,
        listings: Vec<String>,
        products: &mut ProductIndex,
    ) {
        if listings.is_empty() {
            self.paginate(session, base_url, products).await;
            return;
        }
        for listing in listings {
            log::info!("Visiting subcategory: {listing}");
            self.paginate(session, &listing, products).await;
        }
    }

    /// Links matching `selector` on `page_url`; empty when the page fails to load.
    async fn links_on(&self, session: &Session, page_url: &str, selector: &str) -> Vec<String> {
        match session.get_with_retry(page_url, &[]).await {
            Some(body) => select_links(&Html::parse_document(&body), selector, &self.origin),
            None => Vec::new(),
        }
    }

    /// Follows "next page" links from `start` until there are none or a fetch fails.
    async fn paginate(&self, session: &Session, start: &str, products: &mut ProductIndex) {
        let mut visited = HashSet::new();
        let mut next = Some(start.to_string());

        while let Some(page_url) = next.take() {
            if !visited.insert(page_url.clone()) {
                log::warn!("Pagination loops back to {page_url}; stopping");
                break;
            }
            log::info!("Scraping: {page_url}");
            let Some(body) = session.get_with_retry(&page_url, &[]).await else {
                log::warn!("Failed to fetch {page_url}");
                break;
            };

            let (cards, next_page) = {
                let document = Html::parse_document(&body);
                (
                    parse_product_cards(&document, &self.origin, session.stats()),
                    next_page_url(&document, &self.origin),
                )
            };
            for card in cards {
                products.insert(card);
            }
            next = next_page;
        }
    }

    async fn fetch_prices(&self, session: &Session, ims_ids: &[&str]) -> HashMap<String, FieldValue> {
        if ims_ids.is_empty() {
            return HashMap::new();
        }
        let url = self.endpoint(PRICE_PATH);
        session
            .post_json_with_retry(&url, &json!({ "imsIds": ims_ids }))
            .await
            .and_then(|body| decode_json(&body, &url, session.stats()))
            .map(|data| parse_prices(&data))
            .unwrap_or_default()
    }

    async fn fetch_availability(&self, session: &Session, skus: &[&str]) -> HashMap<String, String> {
        if skus.is_empty() {
            return HashMap::new();
        }
        let url = self.endpoint(INVENTORY_PATH);
        session
            .post_json_with_retry(&url, &json!({ "skus": skus }))
            .await
            .and_then(|body| decode_json(&body, &url, session.stats()))
            .map(|data| parse_availability(&data))
            .unwrap_or_default()
    }
}
