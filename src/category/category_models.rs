use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::form_text;
use crate::store::{Patch, Record};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub sub_category: Option<String>,
}

/// Storage shape of the `category_c` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color_c: Option<String>,
    #[serde(default)]
    pub icon_c: Option<String>,
    #[serde(default)]
    pub sub_category_c: Option<String>,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category {
            id: record.id,
            name: record.name.unwrap_or_default(),
            color: record.color_c.unwrap_or_default(),
            icon: record.icon_c.unwrap_or_default(),
            sub_category: record.sub_category_c.filter(|s| !s.is_empty()),
        }
    }
}

pub const DEFAULT_COLOR: &str = "#6B7280";
pub const DEFAULT_ICON: &str = "Folder";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "Category name must be 1 to 50 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "form_text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "form_text")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "form_text")]
    pub sub_category: Option<String>,
}

/// Write shape for a new category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategoryRecord {
    #[serde(rename = "Name")]
    pub name: String,
    pub color_c: String,
    pub icon_c: String,
    pub sub_category_c: Option<String>,
}

impl From<&CreateCategoryRequest> for NewCategoryRecord {
    fn from(request: &CreateCategoryRequest) -> Self {
        NewCategoryRecord {
            name: request.name.trim().to_string(),
            color_c: request.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon_c: request.icon.clone().unwrap_or_else(|| DEFAULT_ICON.to_string()),
            sub_category_c: request.sub_category.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub color: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub icon: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub sub_category: Patch<Option<String>>,
}

impl UpdateCategoryRequest {
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        self.name
            .map(|n| n.trim().to_string())
            .write(&mut record, "Name");
        self.color.write(&mut record, "color_c");
        self.icon.write(&mut record, "icon_c");
        self.sub_category.write(&mut record, "sub_category_c");
        record
    }
}
