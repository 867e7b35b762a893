//! Catalog endpoints: the fixed option lists the wizard renders.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::AppState;
use crate::catalog;
use crate::context::{Intent, Language};
use crate::error::{I18nError, ServiceError};
use crate::i18n::FALLBACK_LOCALE;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOption {
    pub code: &'static str,
    pub native_name: &'static str,
}

/// Response for GET /api/catalog
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub languages: Vec<LanguageOption>,
    pub intents: Vec<Intent>,
    pub states: Vec<&'static str>,
}

/// Response for GET /api/catalog/states/{state}/districts
#[derive(Debug, Serialize)]
pub struct DistrictsResponse {
    pub state: String,
    pub districts: &'static [&'static str],
}

/// Response for GET /api/labels/{lang}
#[derive(Debug, Serialize)]
pub struct LabelsResponse {
    /// The locale actually served, after fallback
    pub locale: String,
    pub labels: BTreeMap<&'static str, String>,
}

/// GET /api/catalog
pub async fn catalog_handler() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        languages: Language::all()
            .into_iter()
            .map(|language| LanguageOption {
                code: language.code(),
                native_name: language.native_name(),
            })
            .collect(),
        intents: Intent::all(),
        states: catalog::states(),
    })
}

/// GET /api/catalog/states/{state}/districts
pub async fn districts_handler(
    State(state): State<Arc<AppState>>,
    Path(region): Path<String>,
) -> Result<Json<DistrictsResponse>, I18nError> {
    if !catalog::is_known_state(&region) {
        return Err(state.i18n_error(ServiceError::UnknownRegion { state: region }));
    }

    Ok(Json(DistrictsResponse {
        districts: catalog::districts(&region),
        state: region,
    }))
}

/// GET /api/labels/{lang} - wizard labels, falling back to Hindi
pub async fn labels_handler(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
) -> Json<LabelsResponse> {
    let i18n = &state.service.i18n;
    let locale = if i18n.has_locale(&lang) {
        lang
    } else {
        FALLBACK_LOCALE.to_string()
    };

    Json(LabelsResponse {
        labels: i18n.labels(&locale),
        locale,
    })
}
