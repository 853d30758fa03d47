//! Supplier billing: who pays for which package, and what is outstanding.

use log::info;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    DeliveryClass, DeliveryError, EntityStore, Package, PackageId, StoreTransaction, SupplierId,
};

/// Packages of one billing state with their aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BillingPartition {
    /// Packages in package id order.
    pub packages: Vec<Package>,
    /// Number of packages.
    pub count: usize,
    /// Sum of package costs.
    pub total_cost: u64,
}

impl FromIterator<Package> for BillingPartition {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let packages: Vec<Package> = iter.into_iter().collect();
        let total_cost = packages
            .iter()
            .fold(0_u64, |sum, package| sum.saturating_add(package.total_cost));
        Self {
            count: packages.len(),
            packages,
            total_cost,
        }
    }
}

/// A supplier's packages split by paid flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliveriesReport {
    /// Settled packages.
    pub paid: BillingPartition,
    /// Packages still owed.
    pub not_paid: BillingPartition,
}

/// Supplier-to-package billing operations.
#[derive(Debug)]
pub struct BillingLedger<'a, S: ?Sized> {
    store: &'a S,
}

impl<S: ?Sized> Clone for BillingLedger<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for BillingLedger<'_, S> {}

impl<'a, S: EntityStore + ?Sized> BillingLedger<'a, S> {
    /// Ledger over `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Bill `package` to `supplier`, unpaid.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::SupplierNotFound`], [`DeliveryError::PackageNotFound`],
    /// [`DeliveryError::PackageAlreadySupplied`] or a store failure.
    pub fn assign_supplier(
        &self,
        supplier: SupplierId,
        package: PackageId,
    ) -> Result<(), DeliveryError> {
        let mut tx = self.store.begin()?;
        assign_in(&mut tx, supplier, package)?;
        tx.commit()?;
        Ok(())
    }

    /// Mark `package` as paid by `supplier`.
    ///
    /// Marking an already paid package again succeeds.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::SupplierNotFound`] for an unknown supplier and
    /// [`DeliveryError::PackageNotFound`] when the supplier does not supply
    /// the package.
    pub fn mark_paid(&self, supplier: SupplierId, package: PackageId) -> Result<(), DeliveryError> {
        let mut tx = self.store.begin()?;
        if tx.supplier(supplier)?.is_none() {
            return Err(DeliveryError::SupplierNotFound { id: supplier });
        }
        if !tx.set_paid(supplier, package, true)? {
            return Err(DeliveryError::PackageNotFound { id: package });
        }
        tx.commit()?;
        info!("supplier {supplier} paid for package {package}");
        Ok(())
    }

    /// Packages supplied by `supplier` whose class is one of `classes`, in id
    /// order.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::SupplierNotFound`] or a store failure.
    pub fn supplier_packages(
        &self,
        supplier: SupplierId,
        classes: &[DeliveryClass],
    ) -> Result<Vec<Package>, DeliveryError> {
        Ok(self
            .supplied(supplier)?
            .into_iter()
            .map(|entry| entry.package)
            .filter(|package| classes.contains(&package.delivery_class))
            .collect())
    }

    /// Split the packages of `supplier` into paid and unpaid.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::SupplierNotFound`] or a store failure.
    pub fn deliveries_report(&self, supplier: SupplierId) -> Result<DeliveriesReport, DeliveryError> {
        let (paid, not_paid): (Vec<_>, Vec<_>) = self
            .supplied(supplier)?
            .into_iter()
            .partition(|entry| entry.paid);
        Ok(DeliveriesReport {
            paid: paid.into_iter().map(|entry| entry.package).collect(),
            not_paid: not_paid.into_iter().map(|entry| entry.package).collect(),
        })
    }

    fn supplied(&self, supplier: SupplierId) -> Result<Vec<crate::SuppliedPackage>, DeliveryError> {
        if self.store.supplier(supplier)?.is_none() {
            return Err(DeliveryError::SupplierNotFound { id: supplier });
        }
        Ok(self.store.supplied_packages(supplier)?)
    }
}

/// Link a supplier inside an open transaction.
pub(crate) fn assign_in<T: StoreTransaction>(
    tx: &mut T,
    supplier: SupplierId,
    package: PackageId,
) -> Result<(), DeliveryError> {
    if tx.supplier(supplier)?.is_none() {
        return Err(DeliveryError::SupplierNotFound { id: supplier });
    }
    if tx.package(package)?.is_none() {
        return Err(DeliveryError::PackageNotFound { id: package });
    }
    if let Some(existing) = tx.supplier_of(package)? {
        return Err(DeliveryError::PackageAlreadySupplied {
            package,
            supplier: existing,
        });
    }
    tx.link_supplier(supplier, package)?;
    Ok(())
}
