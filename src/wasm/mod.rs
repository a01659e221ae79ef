//! WASM bindings for the book
//!
//! Every method takes `&self` and borrows the book dynamically, for as short
//! as possible. A pass holds only the measurer while it measures: an edit
//! made from the measure callback goes through and makes the pass stale,
//! while starting another pass from it gets `Busy`. Subscribers are called
//! after all borrows are released, so they can read the new slides.

mod measurer;

pub use measurer::JsMeasurer;

use crate::{Book, BookConfig, CachedMeasurer, ContentStore, Error, Pass, PassOutcome, Slide, SlideDiff};
use serde::Serialize;
use std::cell::{RefCell, RefMut};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exposed book wrapper
#[wasm_bindgen]
pub struct WasmBook {
    book: RefCell<Book>,
    measurer: RefCell<CachedMeasurer<JsMeasurer>>,
    subscribers: RefCell<Vec<js_sys::Function>>,
}

#[wasm_bindgen]
impl WasmBook {
    /// Create a book from a JSON config; empty or missing means defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmBook, JsValue> {
        let config = match config_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => BookConfig::from_json(json).map_err(to_js)?,
            _ => BookConfig::default(),
        };

        Ok(Self {
            book: RefCell::new(Book::new(config)),
            measurer: RefCell::new(CachedMeasurer::new(JsMeasurer::new())),
            subscribers: RefCell::new(Vec::new()),
        })
    }

    /// Install the measuring function `(text, width, profileJson) => number`
    /// and an optional `(budgetJson) => void` called before each pass
    #[wasm_bindgen(js_name = setMeasurer)]
    pub fn set_measurer(
        &self,
        measure: js_sys::Function,
        calibrate: Option<js_sys::Function>,
    ) -> Result<(), JsValue> {
        let mut measurer = self
            .measurer
            .try_borrow_mut()
            .map_err(|_| to_js(Error::Busy))?;
        measurer.inner_mut().set_functions(measure, calibrate);
        self.book_mut()?.invalidate_layout();
        Ok(())
    }

    #[wasm_bindgen(js_name = upsertTopic)]
    pub fn upsert_topic(&self, chapter: &str, topic: &str, text: &str) -> Result<bool, JsValue> {
        Ok(self.book_mut()?.upsert_topic(chapter, topic, text))
    }

    #[wasm_bindgen(js_name = deleteTopic)]
    pub fn delete_topic(&self, chapter: &str, topic: &str) -> Result<bool, JsValue> {
        Ok(self.book_mut()?.delete_topic(chapter, topic))
    }

    #[wasm_bindgen(js_name = deleteChapter)]
    pub fn delete_chapter(&self, chapter: &str) -> Result<bool, JsValue> {
        Ok(self.book_mut()?.delete_chapter(chapter))
    }

    /// Report a viewport size; returns false for a no-op resize
    pub fn resize(&self, width: f32, height: f32) -> Result<bool, JsValue> {
        Ok(self.book_mut()?.resize(width, height))
    }

    /// Drive the debouncer from a host timer. Returns true if new slides
    /// were published.
    pub fn tick(&self) -> Result<bool, JsValue> {
        let pass = {
            let book = self.book.try_borrow().map_err(|_| to_js(Error::Busy))?;
            if !book.is_due() {
                return Ok(false);
            }
            book.begin_pass()
        };

        match self.run_pass(pass)? {
            Ok(published) => Ok(published),
            Err(err) if err.is_transient() => {
                log::debug!("pass deferred: {}", err);
                Ok(false)
            }
            Err(err) => Err(to_js(err)),
        }
    }

    /// Run a pass now. Returns true if new slides were published.
    pub fn recompute(&self) -> Result<bool, JsValue> {
        let pass = self.with_book(Book::begin_pass)?;
        self.run_pass(pass)?.map_err(to_js)
    }

    /// Latest slides as a JSON array, each with its `key`
    #[wasm_bindgen(js_name = getSlides)]
    pub fn get_slides(&self) -> Result<String, JsValue> {
        self.with_book(|book| slides_json(book.slides()))?
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = getGeneration)]
    pub fn get_generation(&self) -> Result<f64, JsValue> {
        self.with_book(|book| book.generation() as f64)
    }

    /// Call `callback(diffJson)` after each published update
    pub fn subscribe(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.subscribers
            .try_borrow_mut()
            .map_err(|_| to_js(Error::Busy))?
            .push(callback);
        Ok(())
    }

    /// Raw store as `[{name, topics: [{name, content}]}]`
    #[wasm_bindgen(js_name = exportStore)]
    pub fn export_store(&self) -> Result<String, JsValue> {
        self.with_book(|book| book.store().to_json())?
            .map_err(to_js)
    }

    /// Replace the store with the given JSON and schedule a full pass
    #[wasm_bindgen(js_name = importStore)]
    pub fn import_store(&self, json: &str) -> Result<(), JsValue> {
        let store = ContentStore::from_json(json).map_err(to_js)?;
        self.book_mut()?.replace_store(store);
        Ok(())
    }
}

impl WasmBook {
    /// Measure with only the measurer borrowed, then publish. The outer
    /// error is a borrow conflict; the inner one comes from the pass.
    fn run_pass(&self, pass: Pass) -> Result<crate::Result<bool>, JsValue> {
        let output = {
            let mut measurer = self
                .measurer
                .try_borrow_mut()
                .map_err(|_| to_js(Error::Busy))?;
            pass.run(&mut *measurer)
        };

        let outcome = self.book_mut()?.complete_pass(output);
        match outcome {
            Ok(PassOutcome::Updated(diff)) => {
                self.notify(&diff);
                Ok(Ok(true))
            }
            Ok(PassOutcome::Unchanged) => Ok(Ok(false)),
            Ok(PassOutcome::Stale) => {
                log::debug!("pass superseded by a newer change");
                Ok(Ok(false))
            }
            Err(err) => Ok(Err(err)),
        }
    }

    fn notify(&self, diff: &SlideDiff) {
        // Subscribers may subscribe more callbacks
        let callbacks = match self.subscribers.try_borrow() {
            Ok(callbacks) if !callbacks.is_empty() => callbacks.clone(),
            _ => return,
        };

        let json = match serde_json::to_string(diff) {
            Ok(json) => JsValue::from_str(&json),
            Err(err) => {
                log::warn!("could not serialize slide diff: {}", err);
                return;
            }
        };

        for callback in &callbacks {
            if let Err(err) = callback.call1(&JsValue::NULL, &json) {
                log::warn!("subscriber threw: {:?}", err);
            }
        }
    }

    fn book_mut(&self) -> Result<RefMut<'_, Book>, JsValue> {
        self.book.try_borrow_mut().map_err(|_| to_js(Error::Busy))
    }

    fn with_book<T>(&self, f: impl FnOnce(&Book) -> T) -> Result<T, JsValue> {
        let book = self.book.try_borrow().map_err(|_| to_js(Error::Busy))?;
        Ok(f(&book))
    }
}

#[derive(Serialize)]
struct KeyedSlide<'a> {
    key: String,
    #[serde(flatten)]
    slide: &'a Slide,
}

fn slides_json(slides: &[Slide]) -> crate::Result<String> {
    let keyed: Vec<KeyedSlide<'_>> = slides
        .iter()
        .map(|slide| KeyedSlide {
            key: slide.key().to_string(),
            slide,
        })
        .collect();
    Ok(serde_json::to_string(&keyed)?)
}
