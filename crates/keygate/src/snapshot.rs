//! loads an in-memory directory snapshot from the store.

use keygate_access::SnapshotCatalog;
use keygate_store::{KeygateStore, Result, Store};

/// load the whole directory into a [`SnapshotCatalog`].
///
/// archived records are included on purpose: the resolution functions
/// distinguish "archived" from "never existed" when producing warnings.
pub async fn load_catalog(store: &KeygateStore) -> Result<SnapshotCatalog> {
    let mut catalog = SnapshotCatalog::new();

    for role in store.list_roles(true).await? {
        catalog.add_role(role);
    }

    let tenants = store.list_tenants(true).await?;
    for tenant in &tenants {
        for project in store.list_projects(&tenant.uuid, true).await? {
            catalog.add_project(project);
        }
        for user in store.list_users(&tenant.uuid, true).await? {
            catalog.add_user(user);
        }
        for sa in store.list_service_accounts(&tenant.uuid, true).await? {
            catalog.add_service_account(sa);
        }
        for group in store.list_groups(&tenant.uuid, true).await? {
            catalog.add_group(group);
        }
        for binding in store.list_role_bindings(&tenant.uuid, true).await? {
            catalog.add_binding(binding);
        }
        for server in store.list_servers(&tenant.uuid, true).await? {
            catalog.add_server(server);
        }
        for sharing in store.list_sharings_into(&tenant.uuid).await? {
            catalog.add_sharing(sharing);
        }
    }
    for tenant in tenants {
        catalog.add_tenant(tenant);
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use keygate_access::Directory;
    use keygate_types::{Project, Tenant, User};

    use super::*;

    #[tokio::test]
    async fn test_load_catalog_includes_archived() {
        let store = KeygateStore::new_in_memory().await.unwrap();
        let tenant = store.create_tenant(&Tenant::new("acme")).await.unwrap();
        store
            .create_project(&Project::new(tenant.uuid.clone(), "web"))
            .await
            .unwrap();
        let user = store
            .create_user(&User::new(tenant.uuid.clone(), "vasya", "acme"))
            .await
            .unwrap();
        store.archive_user(&user.uuid).await.unwrap();

        let catalog = load_catalog(&store).await.unwrap();
        assert!(catalog.tenant(&tenant.uuid).is_some());
        assert_eq!(catalog.projects_of_tenant(&tenant.uuid).len(), 1);
        // archived user is present, marked
        let loaded = catalog.user(&user.uuid).unwrap();
        assert!(loaded.archive_mark.is_archived());
    }
}
