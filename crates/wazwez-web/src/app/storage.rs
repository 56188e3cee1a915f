use wazwez_core::storage::{
  KeyValueStore,
  MemoryStore
};

/// Browser local storage, or an
/// in-memory map when the page has none
/// (private windows, disabled storage).
#[derive(Debug, Clone)]
pub enum LocalStore {
  Browser(web_sys::Storage),
  Memory(MemoryStore)
}

impl LocalStore {
  pub fn open() -> Self {
    let storage = web_sys::window()
      .and_then(|window| {
        window
          .local_storage()
          .ok()
          .flatten()
      });

    match storage {
      | Some(storage) => {
        Self::Browser(storage)
      }
      | None => {
        tracing::warn!(
          "local storage unavailable; \
           tasks will not survive a \
           reload"
        );
        Self::Memory(MemoryStore::new())
      }
    }
  }
}

fn js_error(
  op: &str,
  key: &str,
  err: &wasm_bindgen::JsValue
) -> anyhow::Error {
  anyhow::anyhow!(
    "local storage {op} failed for \
     {key}: {err:?}"
  )
}

impl KeyValueStore for LocalStore {
  fn get_item(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    match self {
      | Self::Browser(storage) => {
        storage
          .get_item(key)
          .map_err(|err| {
            js_error("read", key, &err)
          })
      }
      | Self::Memory(store) => {
        store.get_item(key)
      }
    }
  }

  fn set_item(
    &self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    match self {
      | Self::Browser(storage) => {
        storage
          .set_item(key, value)
          .map_err(|err| {
            js_error("write", key, &err)
          })
      }
      | Self::Memory(store) => {
        store.set_item(key, value)
      }
    }
  }

  fn remove_item(
    &self,
    key: &str
  ) -> anyhow::Result<()> {
    match self {
      | Self::Browser(storage) => {
        storage
          .remove_item(key)
          .map_err(|err| {
            js_error("remove", key, &err)
          })
      }
      | Self::Memory(store) => {
        store.remove_item(key)
      }
    }
  }
}
