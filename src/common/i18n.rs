// src/common/i18n.rs

use std::{collections::HashMap, sync::LazyLock};

pub const DEFAULT_LANG: &str = "en";

static SHARED: LazyLock<I18nStore> = LazyLock::new(I18nStore::embedded);

/// Mensagens de erro por idioma, carregadas dos arquivos em `locales/`.
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    /// Carrega os idiomas embutidos no binário.
    pub fn embedded() -> Self {
        let mut store = Self::default();
        for (lang, raw) in [
            ("en", include_str!("../../locales/en.json")),
            ("pt", include_str!("../../locales/pt.json")),
        ] {
            match serde_json::from_str::<HashMap<String, String>>(raw) {
                Ok(map) => {
                    store.messages.insert(lang.to_string(), map);
                }
                Err(e) => tracing::error!("Arquivo de idioma '{}' inválido: {}", lang, e),
            }
        }
        store
    }

    pub fn shared() -> &'static I18nStore {
        &SHARED
    }

    /// Busca a chave no idioma pedido, cai para o inglês e, por fim, devolve a própria chave.
    /// Parâmetros substituem `{nome}` no texto.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, &str)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_and_interpolates() {
        let store = I18nStore::embedded();
        let msg = store.translate("en", "not_found", &[("resource", "Order")]);
        assert_eq!(msg, "Order not found.");

        let msg = store.translate("pt", "not_found", &[("resource", "Order")]);
        assert!(msg.contains("Order"));
        assert_ne!(msg, "Order not found.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::embedded();
        assert_eq!(
            store.translate("de", "missing_token", &[]),
            store.translate("en", "missing_token", &[])
        );
    }

    #[test]
    fn unknown_key_is_returned_as_is() {
        let store = I18nStore::embedded();
        assert_eq!(store.translate("en", "no_such_key", &[]), "no_such_key");
    }

    #[test]
    fn every_english_key_has_a_portuguese_translation() {
        let store = I18nStore::embedded();
        let en = store.messages.get("en").expect("en");
        let pt = store.messages.get("pt").expect("pt");
        for key in en.keys() {
            assert!(pt.contains_key(key), "missing pt key {}", key);
        }
    }
}
