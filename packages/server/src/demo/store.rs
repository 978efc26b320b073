//! In-memory employee storage.
//!
//! All data is held in RAM behind a [`RwLock`] and is lost when the process
//! exits. Employees are kept in a [`BTreeMap`] keyed by id, so listing order
//! is creation order.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::{Employee, EmployeeForm, EmployeePatch};

struct Inner {
    employees: BTreeMap<u64, Employee>,
    next_id: u64,
}

/// Thread-safe employee directory.
pub struct EmployeeStore {
    inner: RwLock<Inner>,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                employees: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// A store pre-populated with two employees.
    pub fn with_samples() -> Self {
        let store = Self::new();
        store.create(EmployeeForm {
            name: "Frodo Baggins".into(),
            role: "ring bearer".into(),
        });
        store.create(EmployeeForm {
            name: "Bilbo Baggins".into(),
            role: "burglar".into(),
        });
        store
    }

    pub fn list(&self) -> Vec<Employee> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.employees.values().cloned().collect()
    }

    pub fn get(&self, id: u64) -> Option<Employee> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.employees.get(&id).cloned()
    }

    pub fn create(&self, form: EmployeeForm) -> Employee {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        let employee = Employee {
            id,
            name: form.name,
            role: form.role,
        };
        inner.employees.insert(id, employee.clone());
        employee
    }

    /// Replace every field; `None` if the employee does not exist.
    pub fn replace(&self, id: u64, form: EmployeeForm) -> Option<Employee> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let employee = inner.employees.get_mut(&id)?;
        employee.name = form.name;
        employee.role = form.role;
        Some(employee.clone())
    }

    pub fn patch(&self, id: u64, patch: EmployeePatch) -> Option<Employee> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let employee = inner.employees.get_mut(&id)?;
        if let Some(name) = patch.name {
            employee.name = name;
        }
        if let Some(role) = patch.role {
            employee.role = role;
        }
        Some(employee.clone())
    }

    /// Returns `false` if there was nothing to delete.
    pub fn delete(&self, id: u64) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.employees.remove(&id).is_some()
    }

    /// Case-insensitive substring match on each given field.
    pub fn search(&self, name: Option<&str>, role: Option<&str>) -> Vec<Employee> {
        let matches = |field: &str, needle: Option<&str>| match needle {
            Some(needle) => field.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        };
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .employees
            .values()
            .filter(|e| matches(&e.name, name) && matches(&e.role, role))
            .cloned()
            .collect()
    }
}

impl Default for EmployeeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_from_one() {
        let store = EmployeeStore::with_samples();
        let ids: Vec<u64> = store.list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn patch_leaves_absent_fields() {
        let store = EmployeeStore::with_samples();
        let patched = store
            .patch(
                1,
                EmployeePatch {
                    role: Some("gardener".into()),
                    ..EmployeePatch::default()
                },
            )
            .unwrap();
        assert_eq!(patched.name, "Frodo Baggins");
        assert_eq!(patched.role, "gardener");
    }

    #[test]
    fn missing_employees() {
        let store = EmployeeStore::new();
        assert!(store.get(1).is_none());
        assert!(store
            .replace(
                1,
                EmployeeForm {
                    name: "x".into(),
                    role: "y".into()
                }
            )
            .is_none());
        assert!(!store.delete(1));
    }

    #[test]
    fn search_is_case_insensitive() {
        let store = EmployeeStore::with_samples();
        assert_eq!(store.search(Some("frodo"), None).len(), 1);
        assert_eq!(store.search(None, Some("BURGLAR")).len(), 1);
        assert_eq!(store.search(Some("baggins"), None).len(), 2);
        assert!(store.search(Some("gandalf"), None).is_empty());
    }
}
