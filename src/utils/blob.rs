//! Saving downloaded bytes through object URLs and a synthetic link click.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use filete_core::{ObjectUrlHost, SaveError};

use crate::utils::dom;

/// [`ObjectUrlHost`] for the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserDownloads;

impl ObjectUrlHost for BrowserDownloads {
    fn create_object_url(&self, bytes: &[u8], mime: &str) -> Result<String, SaveError> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(bytes));

        let options = BlobPropertyBag::new();
        options.set_type(mime);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|_| SaveError("failed to create blob".to_string()))?;
        Url::create_object_url_with_blob(&blob)
            .map_err(|_| SaveError("failed to create object URL".to_string()))
    }

    fn trigger_save(&self, url: &str, filename: &str) -> Result<(), SaveError> {
        let document = dom::document().ok_or_else(|| SaveError("no document".to_string()))?;
        let body = dom::body().ok_or_else(|| SaveError("no document body".to_string()))?;

        let anchor = document
            .create_element("a")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok())
            .ok_or_else(|| SaveError("failed to create link".to_string()))?;
        anchor.set_href(url);
        anchor.set_download(filename);

        body.append_child(&anchor)
            .map_err(|_| SaveError("failed to attach link".to_string()))?;
        anchor.click();
        anchor.remove();
        Ok(())
    }

    fn revoke_object_url(&self, url: &str) {
        if Url::revoke_object_url(url).is_err() {
            log::warn!("Failed to revoke object URL {}", url);
        }
    }
}
