// ============================================================================
// MODÈLE : ORDERS (table payments)
// ============================================================================
//
// Description:
//   Une tentative d'achat. La table garde son nom historique `payments`
//   et ses colonnes razorpay_* pour rester compatible avec la base existante.
//
// Colonnes de la table payments:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - razorpay_order_id (VARCHAR, UNIQUE, NOT NULL) - attribué par Razorpay
//   - razorpay_payment_id (VARCHAR, NULL jusqu'au paiement)
//   - razorpay_signature (VARCHAR, NULL jusqu'à la vérification)
//   - amount (INTEGER, NOT NULL) - en paise
//   - currency (VARCHAR, DEFAULT 'INR')
//   - status (VARCHAR, DEFAULT 'created') - 'created' | 'completed'
//   - created_at / updated_at (TIMESTAMP)
//
// Points d'attention:
//   - Le statut ne va que de created vers completed, jamais en arrière
//   - Une commande n'est jamais supprimée
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub razorpay_order_id: String,

    pub razorpay_payment_id: Option<String>,

    pub razorpay_signature: Option<String>,

    pub amount: i32,

    pub currency: String,

    pub status: OrderStatus,

    pub created_at: Option<DateTime>,

    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Transition refusée par la machine à états
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("order cannot move from {from} to {to}")]
pub struct IllegalTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Completed => "completed",
        }
    }

    /// Seule transition permise: created -> completed
    pub fn complete(self) -> Result<OrderStatus, IllegalTransition> {
        match self {
            OrderStatus::Created => Ok(OrderStatus::Completed),
            OrderStatus::Completed => Err(IllegalTransition {
                from: self,
                to: OrderStatus::Completed,
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
