//! Partner business logic - vendors, buyers, brokers and carriers.

use super::{Page, require_text};
use crate::{
    entities::{Partner, PartnerType, partner},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing a partner
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    /// Trading name
    pub name: String,
    /// Role in the operation
    pub partner_type: PartnerType,
    /// Tax document number
    #[serde(default)]
    pub document: Option<String>,
    /// Active flag, `true` when omitted
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Optional filters for [`list_partners`]
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerFilter {
    /// Only partners of this type
    pub partner_type: Option<PartnerType>,
    /// Only active (or inactive) partners
    pub is_active: Option<bool>,
}

fn filtered(filter: PartnerFilter) -> Select<Partner> {
    let mut select = Partner::find();
    if let Some(partner_type) = filter.partner_type {
        select = select.filter(partner::Column::PartnerType.eq(partner_type));
    }
    if let Some(active) = filter.is_active {
        select = select.filter(partner::Column::IsActive.eq(active));
    }
    select
}

fn clean_document(document: Option<String>) -> Option<String> {
    document
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Lists partners alphabetically.
pub async fn list_partners(
    db: &DatabaseConnection,
    filter: PartnerFilter,
    page: Page,
) -> Result<Vec<partner::Model>> {
    page.apply(filtered(filter).order_by_asc(partner::Column::Name))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts partners matching the filter.
pub async fn count_partners(db: &DatabaseConnection, filter: PartnerFilter) -> Result<u64> {
    filtered(filter).count(db).await.map_err(Into::into)
}

/// Finds a partner by its unique ID.
pub async fn get_partner_by_id(
    db: &DatabaseConnection,
    partner_id: i64,
) -> Result<Option<partner::Model>> {
    Partner::find_by_id(partner_id).one(db).await.map_err(Into::into)
}

/// Creates a partner.
pub async fn create_partner(db: &DatabaseConnection, input: NewPartner) -> Result<partner::Model> {
    let name = require_text(&input.name, "partner name")?;

    let model = partner::ActiveModel {
        name: Set(name),
        partner_type: Set(input.partner_type),
        document: Set(clean_document(input.document)),
        is_active: Set(input.is_active),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Replaces every mutable field of an existing partner.
pub async fn update_partner(
    db: &DatabaseConnection,
    partner_id: i64,
    input: NewPartner,
) -> Result<partner::Model> {
    let name = require_text(&input.name, "partner name")?;
    let existing = get_partner_by_id(db, partner_id)
        .await?
        .ok_or_else(|| Error::not_found("partner", partner_id))?;

    let mut active_model: partner::ActiveModel = existing.into();
    active_model.name = Set(name);
    active_model.partner_type = Set(input.partner_type);
    active_model.document = Set(clean_document(input.document));
    active_model.is_active = Set(input.is_active);

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a partner. Purchases and sales keep their rows with the reference cleared.
pub async fn delete_partner(db: &DatabaseConnection, partner_id: i64) -> Result<()> {
    let result = Partner::delete_by_id(partner_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("partner", partner_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_partner_trims_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_partner(
            &db,
            NewPartner {
                name: "  Fazenda Boa Vista ".to_string(),
                partner_type: PartnerType::Vendor,
                document: Some("   ".to_string()),
                is_active: true,
            },
        )
        .await?;

        assert_eq!(partner.name, "Fazenda Boa Vista");
        assert!(partner.document.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_by_type() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_partner(&db, "Vendor A", PartnerType::Vendor).await?;
        create_test_partner(&db, "Buyer A", PartnerType::Buyer).await?;
        create_test_partner(&db, "Vendor B", PartnerType::Vendor).await?;

        let vendors = list_partners(
            &db,
            PartnerFilter {
                partner_type: Some(PartnerType::Vendor),
                is_active: None,
            },
            Page::default(),
        )
        .await?;
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].name, "Vendor A");
        assert_eq!(count_partners(&db, PartnerFilter::default()).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_partner() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_partner(
            &db,
            7,
            NewPartner {
                name: "Ghost".to_string(),
                partner_type: PartnerType::Other,
                document: None,
                is_active: true,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { entity: "partner", .. })));
        Ok(())
    }
}
