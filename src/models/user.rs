//! Modelo de User
//!
//! La identidad del llamador llega verificada desde el colaborador de
//! autenticación (claims del JWT). Este core confía en ella y solo
//! necesita el id y el rol para autorizar transiciones.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rol del usuario autenticado
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Staff,
    Admin,
}

impl UserRole {
    /// Staff y admin pueden operar el ciclo de vida de rentals
    /// y confirmar reservas
    pub fn is_staff(self) -> bool {
        matches!(self, UserRole::Staff | UserRole::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(UserRole::Customer),
            "staff" => Ok(UserRole::Staff),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles() {
        assert!(!UserRole::Customer.is_staff());
        assert!(UserRole::Staff.is_staff());
        assert!(UserRole::Admin.is_staff());
    }

    #[test]
    fn role_round_trip() {
        for role in [UserRole::Customer, UserRole::Staff, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("root".parse::<UserRole>().is_err());
    }
}
