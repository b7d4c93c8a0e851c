#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex, Weak};

    use rand::Rng;

    use crate::catalog::cascade::remove_cascade;
    use crate::catalog::database::Database;
    use crate::catalog::errors::{CatalogError, CatalogResult};
    use crate::catalog::ids::{CatalogObjectId, ResourceId};
    use crate::catalog::kind::ObjectKind;
    use crate::catalog::object::{CatalogObject, Dependents, ObjectBase, ObjectRef, lock};
    use crate::catalog::quote::{
        KEYWORDS, is_keyword, is_plain_identifier, quote_identifier, quote_string, unquote_identifier,
    };
    use crate::catalog::session::{MemorySession, ResourceKind, Session};
    use crate::config::CatalogConfig;

    // -------- node object --------

    /// Minimal kind with explicit dependents, used to drive the cascade.
    struct Node {
        base: ObjectBase,
        dependents: Dependents,
        owners: Vec<Weak<Mutex<Node>>>,
        resource: Option<ResourceId>,
        fixed_name: bool,
    }

    impl CatalogObject for Node {
        fn base(&self) -> &ObjectBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ObjectBase {
            &mut self.base
        }

        fn children(&self) -> Vec<ObjectRef> {
            self.dependents.refs().collect()
        }

        fn create_sql(&self) -> CatalogResult<String> {
            Ok(format!("CREATE NODE {}", self.render_name(true)?))
        }

        fn drop_sql(&self) -> CatalogResult<String> {
            Ok(format!("DROP NODE {}", self.render_name(true)?))
        }

        fn remove_children_and_resources(&mut self, session: &mut dyn Session) -> CatalogResult<()> {
            if let Some(resource) = self.resource {
                session.release(resource)?;
                self.resource = None;
            }
            let id = self.id();
            for owner in &self.owners {
                if let Some(owner) = owner.upgrade() {
                    lock(&owner)?.dependents.remove(id);
                }
            }
            Ok(())
        }

        fn check_rename(&self) -> CatalogResult<()> {
            if self.fixed_name {
                return Err(CatalogError::rename_not_allowed(self.kind(), self.name()?, "fixed"));
            }
            Ok(())
        }
    }

    type NodeRef = Arc<Mutex<Node>>;

    fn database() -> Arc<Database> {
        Arc::new(Database::new(&CatalogConfig::default()))
    }

    fn node(db: &Arc<Database>, name: &str) -> NodeRef {
        Arc::new(Mutex::new(Node {
            base: ObjectBase::new(db, db.allocate_id().unwrap(), name, ObjectKind::TableOrView),
            dependents: Dependents::default(),
            owners: Vec::new(),
            resource: None,
            fixed_name: false,
        }))
    }

    /// Records `child` as a dependent of `owner`.
    fn depend(owner: &NodeRef, child: &NodeRef) {
        let id = child.lock().unwrap().id();
        owner
            .lock()
            .unwrap()
            .dependents
            .push(id, child.clone() as ObjectRef);
        child.lock().unwrap().owners.push(Arc::downgrade(owner));
    }

    fn with_resource(object: &NodeRef, session: &mut MemorySession) -> ResourceId {
        let mut guard = object.lock().unwrap();
        let resource = session
            .allocate(guard.id(), ResourceKind::HeapStorage)
            .unwrap();
        guard.resource = Some(resource);
        resource
    }

    fn valid(object: &NodeRef) -> bool {
        object.lock().unwrap().is_valid()
    }

    // -------- cascade --------

    #[test]
    fn cascade_removes_dependents_before_their_owners() {
        let db = database();
        let mut session = MemorySession::new(1);

        let parent = node(&db, "P");
        let a = node(&db, "A");
        let b = node(&db, "B");
        depend(&parent, &a);
        depend(&parent, &b);
        // b depends on a
        depend(&a, &b);

        let report = remove_cascade(&(parent.clone() as ObjectRef), &mut session).unwrap();

        assert_eq!(report.names(), vec!["B", "A", "P"]);
        assert!(!valid(&parent));
        assert!(!valid(&a));
        assert!(!valid(&b));
    }

    #[test]
    fn cascade_on_leaf_removes_only_the_leaf() {
        let db = database();
        let mut session = MemorySession::new(1);
        let leaf = node(&db, "LEAF");

        let report = remove_cascade(&(leaf.clone() as ObjectRef), &mut session).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.removed[0].kind, ObjectKind::TableOrView);
        assert!(!valid(&leaf));
    }

    #[test]
    fn busy_resource_stops_the_cascade_in_place() {
        let db = database();
        let mut session = MemorySession::new(1);

        let parent = node(&db, "P");
        let a = node(&db, "A");
        let b = node(&db, "B");
        let c = node(&db, "C");
        depend(&parent, &a);
        depend(&parent, &b);
        depend(&parent, &c);
        with_resource(&a, &mut session);
        let busy = with_resource(&b, &mut session);
        assert!(session.pin(busy));

        let err = remove_cascade(&(parent.clone() as ObjectRef), &mut session).unwrap_err();

        assert!(matches!(err, CatalogError::ResourceBusy { resource, .. } if resource == busy));
        assert!(!valid(&a), "removed before the failure");
        assert!(valid(&b));
        assert!(valid(&c), "never reached");
        assert!(valid(&parent));
        assert!(session.is_live(busy));
        assert_eq!(parent.lock().unwrap().children().len(), 2);

        // once the resource is free the same cascade completes
        session.unpin(busy);
        let report = remove_cascade(&(parent.clone() as ObjectRef), &mut session).unwrap();
        assert_eq!(report.names(), vec!["B", "C", "P"]);
    }

    #[test]
    fn invalidated_child_in_a_live_list_is_reported() {
        let db = database();
        let mut session = MemorySession::new(1);

        let parent = node(&db, "P");
        let ghost = node(&db, "GHOST");
        depend(&parent, &ghost);
        // invalidated without detaching from its owner
        ghost.lock().unwrap().base_mut().invalidate().unwrap();

        let err = remove_cascade(&(parent.clone() as ObjectRef), &mut session).unwrap_err();

        assert!(matches!(err, CatalogError::UnknownChildState { kind: ObjectKind::TableOrView, .. }));
        assert!(err.is_internal());
        assert!(valid(&parent));
    }

    #[test]
    fn dependency_cycle_is_detected() {
        let db = database();
        let mut session = MemorySession::new(1);

        let a = node(&db, "A");
        let b = node(&db, "B");
        depend(&a, &b);
        depend(&b, &a);

        let err = remove_cascade(&(a.clone() as ObjectRef), &mut session).unwrap_err();

        assert!(matches!(err, CatalogError::DependencyCycle { .. }));
        assert!(valid(&a));
        assert!(valid(&b));
    }

    #[test]
    fn cascade_on_invalidated_root_fails() {
        let db = database();
        let mut session = MemorySession::new(1);
        let object = node(&db, "X");
        remove_cascade(&(object.clone() as ObjectRef), &mut session).unwrap();

        let err = remove_cascade(&(object as ObjectRef), &mut session).unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyInvalidated { .. }));
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let db = database();
        let mut session = MemorySession::new(1);

        let root = node(&db, "N0");
        let mut last = root.clone();
        for i in 1..5_000 {
            let next = node(&db, &format!("N{i}"));
            depend(&last, &next);
            last = next;
        }

        let report = remove_cascade(&(root.clone() as ObjectRef), &mut session).unwrap();
        assert_eq!(report.len(), 5_000);
        assert_eq!(report.removed.last().map(|r| r.name.as_str()), Some("N0"));
    }

    // -------- lifecycle --------

    #[test]
    fn invalidate_twice_fails() {
        let db = database();
        let object = node(&db, "X");
        let mut guard = object.lock().unwrap();

        guard.base_mut().invalidate().unwrap();
        assert!(!guard.is_valid());
        assert_eq!(guard.id(), CatalogObjectId::INVALID);

        let err = guard.base_mut().invalidate().unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyInvalidated { .. }));
    }

    #[test]
    fn accessors_fail_after_invalidation() {
        let db = database();
        let object = node(&db, "X");
        let mut guard = object.lock().unwrap();
        guard.base_mut().invalidate().unwrap();

        assert_eq!(guard.name().unwrap_err(), CatalogError::Invalidated { kind: ObjectKind::TableOrView });
        assert!(guard.modification_version().is_err());
        assert!(guard.create_sql().is_err());
        assert!(guard.rename("Y").is_err());
        assert!(guard.set_comment(Some("c".into())).is_err());
        assert_eq!(guard.base().to_string(), "<invalid>:-1:TABLE");
    }

    #[test]
    fn rename_advances_version() {
        let db = database();
        let object = node(&db, "OLD");
        let mut guard = object.lock().unwrap();
        let before = guard.modification_version().unwrap();

        guard.rename("NEW").unwrap();

        assert_eq!(guard.name().unwrap(), "NEW");
        assert!(guard.modification_version().unwrap() > before);
    }

    #[test]
    fn refused_rename_changes_nothing() {
        let db = database();
        let object = node(&db, "FIXED");
        let mut guard = object.lock().unwrap();
        guard.fixed_name = true;
        let before = guard.modification_version().unwrap();

        let err = guard.rename("OTHER").unwrap_err();

        assert!(matches!(err, CatalogError::RenameNotAllowed { .. }));
        assert_eq!(guard.name().unwrap(), "FIXED");
        assert_eq!(guard.modification_version().unwrap(), before);
    }

    #[test]
    fn comment_versioning_follows_temporary_flag() {
        let db = database();
        let object = node(&db, "X");
        let mut guard = object.lock().unwrap();

        let v0 = guard.modification_version().unwrap();
        guard.set_comment(Some("persistent".into())).unwrap();
        let v1 = guard.modification_version().unwrap();
        assert!(v1 > v0);
        assert_eq!(guard.comment().unwrap(), Some("persistent"));

        guard.set_temporary(true).unwrap();
        assert_eq!(guard.modification_version().unwrap(), v1);

        guard.set_comment(None).unwrap();
        assert_eq!(guard.modification_version().unwrap(), v1);
        assert_eq!(guard.comment().unwrap(), None);
    }

    #[test]
    fn versions_are_shared_across_objects() {
        let db = database();
        let a = node(&db, "A");
        let b = node(&db, "B");

        a.lock().unwrap().rename("A2").unwrap();
        let va = a.lock().unwrap().modification_version().unwrap();
        b.lock().unwrap().rename("B2").unwrap();
        let vb = b.lock().unwrap().modification_version().unwrap();

        assert!(vb > va);
        assert_eq!(db.current_version(), vb);
    }

    #[test]
    fn closed_database_is_reported() {
        let db = database();
        let object = node(&db, "X");
        drop(db);

        let err = object.lock().unwrap().rename("Y").unwrap_err();
        assert_eq!(err, CatalogError::DatabaseClosed);
        assert_eq!(object.lock().unwrap().name().unwrap(), "X");
    }

    #[test]
    fn id_space_exhaustion_is_an_error() {
        let config = CatalogConfig::default().with_first_object_id(i32::MAX - 1);
        let db = Database::new(&config);

        assert_eq!(db.allocate_id().unwrap(), CatalogObjectId(i32::MAX - 1));
        assert_eq!(db.allocate_id().unwrap_err(), CatalogError::IdSpaceExhausted);
    }

    // -------- kinds --------

    #[test]
    fn kind_tags_are_stable() {
        for (tag, kind) in ObjectKind::ALL.iter().enumerate() {
            assert_eq!(kind.as_u8() as usize, tag);
            assert_eq!(ObjectKind::try_from(tag as u8).unwrap(), *kind);
        }
        assert_eq!(ObjectKind::try_from(16).unwrap_err(), CatalogError::UnknownKind { tag: 16 });
        assert_eq!(ObjectKind::Schema.keyword(), "SCHEMA");
        assert!(ObjectKind::Index.is_schema_bound());
        assert!(!ObjectKind::User.is_schema_bound());
    }

    // -------- quoting --------

    #[test]
    fn embedded_quote_round_trips() {
        let quoted = quote_identifier("MY\"TABLE", true);
        assert_eq!(quoted, "\"MY\"\"TABLE\"");
        assert_eq!(unquote_identifier(&quoted).as_deref(), Some("MY\"TABLE"));
    }

    #[test]
    fn plain_names_skip_quotes_unless_forced() {
        assert_eq!(quote_identifier("ORDERS", false), "ORDERS");
        assert_eq!(quote_identifier("ORDERS", true), "\"ORDERS\"");
        assert_eq!(quote_identifier("orders", false), "\"orders\"");
        assert_eq!(quote_identifier("SELECT", false), "\"SELECT\"");
        assert_eq!(quote_identifier("1ST", false), "\"1ST\"");
        assert!(is_plain_identifier("_ID"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn malformed_quoted_identifier_is_rejected() {
        assert_eq!(unquote_identifier("\"A\"B\""), None);
        assert_eq!(unquote_identifier("lower"), None);
        assert_eq!(unquote_identifier("UPPER").as_deref(), Some("UPPER"));
    }

    #[test]
    fn random_names_round_trip() {
        const ALPHABET: &[char] = &['A', 'b', '"', ' ', '_', '1', 'é', '\'', '.'];
        let mut rng = rand::rng();

        for _ in 0..500 {
            let len = rng.random_range(1..12);
            let name: String = (0..len)
                .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
                .collect();
            for always in [true, false] {
                let quoted = quote_identifier(&name, always);
                assert_eq!(unquote_identifier(&quoted).as_deref(), Some(name.as_str()), "{quoted}");
            }
        }
    }

    #[test]
    fn session_releases_each_resource_once() {
        let mut session = MemorySession::new(7);
        let resource = session
            .allocate(CatalogObjectId(3), ResourceKind::HeapStorage)
            .unwrap();

        session.release(resource).unwrap();
        assert_eq!(
            session.release(resource).unwrap_err(),
            CatalogError::UnknownResource { resource }
        );
        assert_eq!(session.released(), &[resource]);
        assert!(!session.is_live(resource));
    }

    #[test]
    fn string_literals_double_single_quotes() {
        assert_eq!(quote_string("it's"), "'it''s'");
        assert_eq!(quote_string(""), "''");
    }

    #[test]
    fn keyword_list_is_sorted() {
        // is_keyword binary-searches it
        assert!(KEYWORDS.windows(2).all(|w| w[0] < w[1]));
        for word in ["SELECT", "_ROWID_", "ALL", "YEAR", "CURRENT_USER"] {
            assert!(is_keyword(word), "{word}");
        }
        assert!(!is_keyword("ORDERS"));
    }
}
