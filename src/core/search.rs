use crate::core::filter::SearchFilter;
use crate::core::query::ListingQuery;
use crate::core::render::SearchView;
use crate::domain::model::Listing;
use crate::domain::ports::ListingStore;
use crate::utils::error::Result;

/// 每次送出搜尋時發的序號，用來判斷回應是否已過期
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// 一個搜尋畫面的狀態：同一時間只採用最新一次查詢的結果
pub struct SearchSession<S: ListingStore> {
    store: S,
    view: SearchView,
    latest: u64,
    active_only: bool,
}

impl<S: ListingStore> SearchSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            view: SearchView::Results(Vec::new()),
            latest: 0,
            active_only: false,
        }
    }

    /// 強制只搜尋已公開的教室，不論條件怎麼給
    pub fn with_active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    pub fn view(&self) -> &SearchView {
        &self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 開始新的查詢：舊結果立刻清掉，畫面進入讀取中
    pub fn begin(&mut self, filter: &SearchFilter) -> (SearchTicket, ListingQuery) {
        self.latest += 1;
        self.view = SearchView::Loading;

        let filter = if self.active_only {
            filter.clone().active_only(true)
        } else {
            filter.clone()
        };
        let query = ListingQuery::from_filter(&filter);

        tracing::debug!(
            "Search #{} started with {} predicate(s)",
            self.latest,
            query.predicates().len()
        );
        (SearchTicket(self.latest), query)
    }

    /// 套用查詢結果；過期的回應直接丟棄並回傳 false
    pub fn complete(&mut self, ticket: SearchTicket, result: Result<Vec<Listing>>) -> bool {
        if ticket.0 != self.latest {
            tracing::debug!(
                "Discarding stale search #{} (latest is #{})",
                ticket.0,
                self.latest
            );
            return false;
        }

        self.view = match result {
            Ok(listings) => {
                tracing::info!("Search #{} returned {} listing(s)", ticket.0, listings.len());
                SearchView::Results(listings)
            }
            Err(e) => {
                if e.is_fetch_failure() {
                    tracing::error!("Search #{} failed: {} ({:?})", ticket.0, e, e.category());
                } else {
                    tracing::warn!("Search #{} rejected: {}", ticket.0, e);
                }
                SearchView::Failed(e.to_string())
            }
        };
        true
    }

    pub async fn submit(&mut self, filter: &SearchFilter) -> &SearchView {
        let (ticket, query) = self.begin(filter);
        let result = self.store.search(&query).await;
        self.complete(ticket, result);
        &self.view
    }
}
