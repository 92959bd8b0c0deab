// ============================================================================
// MODÈLE : ACCOUNTS (table user_details)
// ============================================================================
//
// Description:
//   Un utilisateur inscrit après paiement. Table historique `user_details`:
//   la colonne payment_id référence payments.id et has_purchased donne
//   l'accès au contenu.
//
// Colonnes de la table user_details:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - payment_id (INTEGER, FK vers payments, NULL possible pour l'historique)
//   - email (VARCHAR, UNIQUE, NOT NULL) - sensible à la casse
//   - password_hash (VARCHAR, NOT NULL) - bcrypt $2b$10$...
//   - name, age, phone_number, gender, college_name, college_address,
//     current_status, course, year_of_studying, year_of_passedout, reason, cgpa
//   - has_purchased (BOOLEAN, DEFAULT FALSE)
//   - created_at (TIMESTAMP)
//
// Points d'attention:
//   - L'unicité de l'email est garantie par la base, pas par un verrou
//   - password_hash ne sort jamais en JSON
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_name = "payment_id")]
    pub order_id: Option<i32>,

    #[sea_orm(unique)]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,

    pub age: i32,

    pub phone_number: String,

    pub gender: String,

    pub college_name: String,

    #[sea_orm(column_type = "Text")]
    pub college_address: String,

    pub current_status: String,

    pub course: Option<String>,

    pub year_of_studying: Option<String>,

    pub year_of_passedout: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    #[sea_orm(column_type = "Decimal(Some((3, 2)))", nullable)]
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cgpa: Option<Decimal>,

    #[sea_orm(column_name = "has_purchased")]
    pub has_access: bool,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Order,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
