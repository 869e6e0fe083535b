use std::{cmp::Ordering, str::FromStr};

use remote::RemoteSource;
use shared::{error::ControllerResult, ControllerError, Record, RecordId};
use storage::{read_collection, CollectionStore};
use tracing::{debug, info, warn};

use crate::{
    criteria::Criteria,
    ids::{IdAllocator, IdStrategy},
    pagination::{paginate, PageSlice},
    samples::SampleRecords,
};

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Which source `load` tries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOrder {
    /// Remote source, then the persisted store, then synthetic samples.
    #[default]
    RemoteFirst,
    /// Persisted store, then the remote source, then synthetic samples.
    LocalFirst,
}

impl FromStr for LoadOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote-first" | "remote_first" | "remote" => Ok(Self::RemoteFirst),
            "local-first" | "local_first" | "local" => Ok(Self::LocalFirst),
            other => Err(format!("unknown load order '{other}'")),
        }
    }
}

/// Where the working collection came from on the last `load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Local,
    Samples,
}

struct ActiveFilter<T> {
    predicate: Predicate<T>,
    compare: Option<Comparator<T>>,
}

/// Owns one collection, its filtered view and the page cursor.
///
/// The view is always recomputed from the full collection; it is never the
/// source of truth. Every mutation writes the whole collection back to the
/// store before returning.
pub struct ListViewController<T: Record, S: CollectionStore> {
    store: S,
    records: Vec<T>,
    view: Vec<T>,
    filter: Option<ActiveFilter<T>>,
    current_page: usize,
    page_size: usize,
    load_order: LoadOrder,
    sample_count: Option<usize>,
    ids: IdAllocator,
    loaded_from: Option<LoadSource>,
}

impl<T: Record, S: CollectionStore> ListViewController<T, S> {
    pub fn new(store: S, page_size: usize) -> Self {
        Self {
            store,
            records: Vec::new(),
            view: Vec::new(),
            filter: None,
            current_page: 1,
            page_size: page_size.max(1),
            load_order: LoadOrder::default(),
            sample_count: None,
            ids: IdAllocator::default(),
            loaded_from: None,
        }
    }

    pub fn with_load_order(mut self, load_order: LoadOrder) -> Self {
        self.load_order = load_order;
        self
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        let mut ids = IdAllocator::new(strategy);
        ids.observe(&self.records);
        self.ids = ids;
        self
    }

    /// Overrides how many synthetic records a last-resort load generates.
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = Some(count);
        self
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.ids.strategy()
    }

    pub fn collection(&self) -> &'static str {
        T::COLLECTION
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn view(&self) -> &[T] {
        &self.view
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_from(&self) -> Option<LoadSource> {
        self.loaded_from
    }

    pub fn find(&self, id: &RecordId) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Recomputes the view from the full collection and returns to page 1.
    pub fn apply_filter<F>(&mut self, predicate: F) -> &[T]
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(ActiveFilter {
            predicate: Box::new(predicate),
            compare: None,
        });
        self.refresh_view();
        self.current_page = 1;
        &self.view
    }

    /// Like [`apply_filter`](Self::apply_filter), then stable-sorts the view.
    pub fn apply_filter_sorted<F, C>(&mut self, predicate: F, compare: C) -> &[T]
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.filter = Some(ActiveFilter {
            predicate: Box::new(predicate),
            compare: Some(Box::new(compare)),
        });
        self.refresh_view();
        self.current_page = 1;
        &self.view
    }

    pub fn apply_criteria<C>(&mut self, criteria: C) -> &[T]
    where
        C: Criteria<T> + Send + Sync + 'static,
    {
        self.apply_filter(move |record| criteria.matches(record))
    }

    pub fn clear_filter(&mut self) -> &[T] {
        self.filter = None;
        self.refresh_view();
        self.current_page = 1;
        &self.view
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.view.len().div_ceil(self.page_size)
    }

    /// Moves the cursor. Pages outside `[1, total_pages]` leave it untouched.
    pub fn go_to_page(&mut self, page: i64) -> bool {
        let Ok(page) = usize::try_from(page) else {
            return false;
        };
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page as i64 + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.current_page as i64 - 1)
    }

    pub fn current_slice(&self) -> PageSlice<'_, T> {
        paginate(&self.view, self.current_page as i64, self.page_size).0
    }

    /// Assigns a fresh id, prepends the record and persists the collection.
    pub async fn create(&mut self, mut data: T) -> ControllerResult<T> {
        data.set_id(self.ids.next_id());
        self.records.insert(0, data.clone());

        if let Err(error) = self.persist().await {
            self.records.remove(0);
            return Err(error);
        }

        info!(collection = T::COLLECTION, id = %data.id(), "record created");
        self.refresh_after_mutation();
        Ok(data)
    }

    /// Shallow-merges `patch` over the record with `id` and persists.
    pub async fn update(&mut self, id: &RecordId, patch: T::Patch) -> ControllerResult<T> {
        let Some(index) = self.position(id) else {
            return Err(ControllerError::not_found(T::COLLECTION, id));
        };

        let previous = self.records[index].clone();
        self.records[index].apply_patch(patch);

        if let Err(error) = self.persist().await {
            self.records[index] = previous;
            return Err(error);
        }

        info!(collection = T::COLLECTION, %id, "record updated");
        let updated = self.records[index].clone();
        self.refresh_after_mutation();
        Ok(updated)
    }

    /// Removes the first record with `id`. Persists only when something was removed.
    pub async fn delete(&mut self, id: &RecordId) -> ControllerResult<bool> {
        let Some(index) = self.position(id) else {
            debug!(collection = T::COLLECTION, %id, "delete target absent");
            return Ok(false);
        };

        let removed = self.records.remove(index);
        if let Err(error) = self.persist().await {
            self.records.insert(index, removed);
            return Err(error);
        }

        info!(collection = T::COLLECTION, %id, "record deleted");
        self.refresh_after_mutation();
        Ok(true)
    }

    /// Drops the persisted collection and clears memory; the next `load` starts over.
    pub async fn reset(&mut self) -> ControllerResult<bool> {
        let existed = self
            .store
            .remove(T::COLLECTION)
            .await
            .map_err(|error| ControllerError::Storage(format!("{error:#}")))?;

        self.records.clear();
        self.view.clear();
        self.filter = None;
        self.current_page = 1;
        self.loaded_from = None;
        info!(collection = T::COLLECTION, existed, "collection reset");
        Ok(existed)
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    async fn persist(&self) -> ControllerResult<()> {
        let payload = serde_json::to_string(&self.records)?;
        self.store
            .write(T::COLLECTION, &payload)
            .await
            .map_err(|error| ControllerError::Storage(format!("{error:#}")))
    }

    fn refresh_view(&mut self) {
        self.view = match &self.filter {
            Some(filter) => {
                let mut view: Vec<T> = self
                    .records
                    .iter()
                    .filter(|record| (filter.predicate)(record))
                    .cloned()
                    .collect();
                if let Some(compare) = &filter.compare {
                    view.sort_by(|a, b| compare(a, b));
                }
                view
            }
            None => self.records.clone(),
        };
    }

    fn refresh_after_mutation(&mut self) {
        self.refresh_view();
        self.current_page = self.current_page.clamp(1, self.total_pages().max(1));
    }

    fn install(&mut self, records: Vec<T>, source: LoadSource) {
        self.ids.observe(&records);
        self.records = records;
        self.filter = None;
        self.refresh_view();
        self.current_page = 1;
        self.loaded_from = Some(source);
    }
}

impl<T: SampleRecords, S: CollectionStore> ListViewController<T, S> {
    /// Fills the collection from the first source that has records.
    ///
    /// Remote and local failures fall through to the next source. Only a
    /// failure to persist freshly generated samples is reported.
    pub async fn load(&mut self, remote: &dyn RemoteSource<T>) -> ControllerResult<&[T]> {
        let loaded = match self.load_order {
            LoadOrder::RemoteFirst => match self.fetch_remote(remote).await {
                Some(records) => Some((records, LoadSource::Remote)),
                None => self
                    .read_local()
                    .await
                    .map(|records| (records, LoadSource::Local)),
            },
            LoadOrder::LocalFirst => match self.read_local().await {
                Some(records) => Some((records, LoadSource::Local)),
                None => self
                    .fetch_remote(remote)
                    .await
                    .map(|records| (records, LoadSource::Remote)),
            },
        };

        match loaded {
            Some((records, LoadSource::Remote)) => {
                self.install(records, LoadSource::Remote);
                if let Err(error) = self.persist().await {
                    warn!(collection = T::COLLECTION, %error, "failed to mirror remote records locally");
                }
            }
            Some((records, source)) => self.install(records, source),
            None => {
                let count = self.sample_count.unwrap_or(T::DEFAULT_SAMPLE_COUNT);
                info!(collection = T::COLLECTION, count, "generating sample records");
                self.install(T::samples(count), LoadSource::Samples);
                self.persist()
                    .await
                    .map_err(|error| ControllerError::LoadFailure {
                        collection: T::COLLECTION.to_string(),
                        message: error.to_string(),
                    })?;
            }
        }

        info!(
            collection = T::COLLECTION,
            count = self.records.len(),
            source = ?self.loaded_from,
            "collection loaded"
        );
        Ok(&self.records)
    }

    async fn fetch_remote(&self, remote: &dyn RemoteSource<T>) -> Option<Vec<T>> {
        match remote.fetch_all().await {
            Ok(records) if !records.is_empty() => Some(records),
            Ok(_) => {
                debug!(collection = T::COLLECTION, "remote source returned no records");
                None
            }
            Err(error) => {
                warn!(collection = T::COLLECTION, error = %format!("{error:#}"), "remote load failed, falling back");
                None
            }
        }
    }

    async fn read_local(&self) -> Option<Vec<T>> {
        match read_collection::<T, S>(&self.store, T::COLLECTION).await {
            Ok(Some(records)) if !records.is_empty() => Some(records),
            Ok(_) => None,
            Err(error) => {
                warn!(collection = T::COLLECTION, error = %format!("{error:#}"), "stored collection unreadable, falling back");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
