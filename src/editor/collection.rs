use std::marker::PhantomData;

use chrono::NaiveDate;
use serde_json::Value;

use super::document::{BoundDocument, Shape};
use super::{capitalize, Confirm, EditorError, EditorState, Notice, Outcome, Status};
use crate::ordering::{self, EventPartition};
use crate::record::{assign_ids, conform, unique_id, Category, Event, Record};
use crate::session::Session;
use crate::store::{DocumentStore, VersionTag};

/// Editor for a collection file (books, events, writing, ...).
///
/// Records are addressed by their stable `id`. Records stored without one
/// are given an id derived from their title when loaded; the ids are written
/// out with the next save. The `_at` variants address records by position
/// in file order instead.
pub struct CollectionEditor<'a, S, R> {
    doc: BoundDocument<'a, S>,
    status: Status,
    _marker: PhantomData<R>,
}

impl<'a, S: DocumentStore, R: Record> CollectionEditor<'a, S, R> {
    pub fn new(session: &'a Session<S>) -> Self {
        Self {
            doc: BoundDocument::new(session, R::CATEGORY, Shape::Array),
            status: Status::default(),
            _marker: PhantomData,
        }
    }

    pub fn category(&self) -> &'static Category {
        R::CATEGORY
    }

    pub fn state(&self) -> EditorState {
        self.status.state()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.status.notice()
    }

    /// Version tag of the cached document; `None` before the file exists.
    pub async fn version(&self) -> Option<VersionTag> {
        self.doc.version().await
    }

    /// Fetch and decode the file. Returns the number of records.
    ///
    /// On failure the previously loaded collection, if any, stays cached.
    pub async fn load(&mut self) -> Result<usize, EditorError> {
        self.status.begin(EditorState::Loading);
        let path = self.doc.path();
        let result = self
            .doc
            .load(|body| {
                let items = body
                    .as_array_mut()
                    .ok_or_else(|| EditorError::schema(path, "expected an array literal"))?;
                let assigned = assign_ids(items);
                if assigned > 0 {
                    tracing::debug!(path, assigned, "assigned record ids");
                }
                for item in items.iter() {
                    serde_json::from_value::<R>(item.clone())
                        .map_err(|e| EditorError::schema(path, e))?;
                }
                Ok(())
            })
            .await
            .map(|cached| cached.body.as_array().map_or(0, Vec::len));

        let loaded = self.doc.is_loaded().await;
        let name = R::CATEGORY.name;
        self.status.settle(
            &result,
            loaded,
            |count| Notice::info(format!("Loaded {} {}", count, name)),
            &format!("Error loading {}", name),
        );
        result
    }

    /// Records in the category's display order as of today.
    pub async fn records(&self) -> Result<Vec<R>, EditorError> {
        self.records_on(ordering::today_local()).await
    }

    /// Records in the category's display order, with `today` as the
    /// reference day for date-split categories.
    pub async fn records_on(&self, today: NaiveDate) -> Result<Vec<R>, EditorError> {
        let items = self.items().await?;
        ordering::arrange(R::CATEGORY.ordering, items, today)
            .into_iter()
            .map(|value| self.typed(value))
            .collect()
    }

    /// Records in file order.
    pub async fn listing(&self) -> Result<Vec<R>, EditorError> {
        self.items()
            .await?
            .into_iter()
            .map(|value| self.typed(value))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<R>, EditorError> {
        let items = self.items().await?;
        match position(&items, id) {
            Some(index) => self.typed(items[index].clone()).map(Some),
            None => Ok(None),
        }
    }

    /// Append a record. A record without an id gets one from its title.
    pub async fn create(&mut self, record: R) -> Result<Outcome, EditorError> {
        self.status.begin(EditorState::Saving);
        let label = R::CATEGORY.label;
        let result = self
            .write_change(|items| {
                let mut record = record;
                match record.id().map(str::to_string) {
                    Some(id) if ids(items).any(|existing| existing == id) => {
                        return Err(EditorError::DuplicateRecord(id));
                    }
                    Some(_) => {}
                    None => {
                        let id = unique_id(record.title(), ids(items));
                        record.set_id(id);
                    }
                }
                items.push(validated(&record)?);
                Ok(format!("Add {}: {}", label, record.title()))
            })
            .await;
        self.finish(result, "saved", "Error saving")
    }

    /// Replace the record with `id`, keeping its position. The stored record
    /// takes the fields of `record` as given.
    pub async fn update(&mut self, id: &str, record: R) -> Result<Outcome, EditorError> {
        self.status.begin(EditorState::Saving);
        let result = self
            .write_change(|items| {
                let index =
                    position(items, id).ok_or_else(|| EditorError::UnknownRecord(id.to_string()))?;
                replace(items, index, record)
            })
            .await;
        self.finish(result, "saved", "Error saving")
    }

    /// Replace the record at `index` in file order.
    pub async fn update_at(&mut self, index: usize, record: R) -> Result<Outcome, EditorError> {
        self.status.begin(EditorState::Saving);
        let result = self
            .write_change(|items| {
                check_index(items, index)?;
                replace(items, index, record)
            })
            .await;
        self.finish(result, "saved", "Error saving")
    }

    /// Remove the record with `id` once `confirm` agrees.
    pub async fn delete(
        &mut self,
        id: &str,
        mut confirm: impl Confirm,
    ) -> Result<Outcome, EditorError> {
        if !confirm.confirm(&self.delete_prompt()) {
            return Ok(self.cancelled());
        }
        self.status.begin(EditorState::Saving);
        let result = self
            .write_change(|items| {
                let index =
                    position(items, id).ok_or_else(|| EditorError::UnknownRecord(id.to_string()))?;
                Ok(remove::<R>(items, index))
            })
            .await;
        self.finish(result, "deleted", "Error deleting")
    }

    /// Remove the record at `index` in file order once `confirm` agrees.
    pub async fn delete_at(
        &mut self,
        index: usize,
        mut confirm: impl Confirm,
    ) -> Result<Outcome, EditorError> {
        if !confirm.confirm(&self.delete_prompt()) {
            return Ok(self.cancelled());
        }
        self.status.begin(EditorState::Saving);
        let result = self
            .write_change(|items| {
                check_index(items, index)?;
                Ok(remove::<R>(items, index))
            })
            .await;
        self.finish(result, "deleted", "Error deleting")
    }

    fn delete_prompt(&self) -> String {
        format!("Are you sure you want to delete this {}?", R::CATEGORY.label)
    }

    fn cancelled(&mut self) -> Outcome {
        self.status.set_notice(Notice::info("Delete cancelled"));
        Outcome::Cancelled
    }

    /// Apply `change` to a copy of the cached records and write the result
    /// under the slot's lock. `change` returns the commit message.
    async fn write_change<F>(&self, change: F) -> Result<VersionTag, EditorError>
    where
        F: FnOnce(&mut Vec<Value>) -> Result<String, EditorError>,
    {
        let mut guard = self.doc.slot().lock().await;
        let mut items = match guard.as_ref() {
            Some(cached) => match &cached.body {
                Value::Array(items) => items.clone(),
                _ => return Err(EditorError::schema(self.doc.path(), "expected an array literal")),
            },
            None => return Err(self.doc.not_loaded()),
        };

        let message = change(&mut items)?;
        self.doc
            .commit(&mut guard, Value::Array(items), &message)
            .await
    }

    fn finish(
        &mut self,
        result: Result<VersionTag, EditorError>,
        done: &str,
        context: &str,
    ) -> Result<Outcome, EditorError> {
        let result = result.map(|version| Outcome::Saved { version });
        let loaded = !matches!(result, Err(EditorError::NotLoaded { .. }));
        let label = R::CATEGORY.label;
        self.status.settle(
            &result,
            loaded,
            |_| Notice::success(format!("{} {}", capitalize(label), done)),
            &format!("{} {}", context, label),
        );
        result
    }

    async fn items(&self) -> Result<Vec<Value>, EditorError> {
        match self.doc.body().await? {
            Value::Array(items) => Ok(items),
            _ => Err(EditorError::schema(self.doc.path(), "expected an array literal")),
        }
    }

    fn typed(&self, value: Value) -> Result<R, EditorError> {
        serde_json::from_value(value).map_err(|e| EditorError::schema(self.doc.path(), e))
    }
}

impl<'a, S: DocumentStore> CollectionEditor<'a, S, Event> {
    /// Upcoming events (on or after `today`, soonest first) and past events
    /// (most recent first).
    pub async fn partition(&self, today: NaiveDate) -> Result<EventPartition<Event>, EditorError> {
        let events = self.listing().await?;
        Ok(ordering::partition_events(events, today, |event| {
            ordering::parse_date(&event.date)
        }))
    }
}

fn ids(items: &[Value]) -> impl Iterator<Item = &str> + Clone + '_ {
    items.iter().filter_map(|item| item.get("id")?.as_str())
}

fn position(items: &[Value], id: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.get("id").and_then(Value::as_str) == Some(id))
}

fn check_index(items: &[Value], index: usize) -> Result<(), EditorError> {
    if index >= items.len() {
        return Err(EditorError::IndexOutOfRange {
            index,
            len: items.len(),
        });
    }
    Ok(())
}

fn title_of(item: &Value) -> &str {
    item.get("title").and_then(Value::as_str).unwrap_or_default()
}

/// Serialize a record and check the category's required fields.
fn validated<R: Record>(record: &R) -> Result<Value, EditorError> {
    let value = serde_json::to_value(record)
        .map_err(|e| EditorError::schema(R::CATEGORY.path, e))?;
    let missing = R::CATEGORY.missing_fields(&value);
    if !missing.is_empty() {
        return Err(EditorError::Validation { missing });
    }
    Ok(value)
}

fn replace<R: Record>(items: &mut [Value], index: usize, mut record: R) -> Result<String, EditorError> {
    let current_id = items[index].get("id").and_then(Value::as_str).map(str::to_string);
    if let Some(id) = current_id {
        record.set_id(id);
    }
    let mut value = validated(&record)?;
    conform(&mut value, &items[index]);
    items[index] = value;
    Ok(format!("Update {}: {}", R::CATEGORY.label, record.title()))
}

fn remove<R: Record>(items: &mut Vec<Value>, index: usize) -> String {
    let removed = items.remove(index);
    format!("Delete {}: {}", R::CATEGORY.label, title_of(&removed))
}
