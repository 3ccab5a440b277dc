//! `SeaORM` Entity definitions for the task manager schema.

pub mod sea_orm_active_enums;
pub mod task;
