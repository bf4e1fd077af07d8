//! Integration tests over object graphs built from derived types.

use isomer_core::{
    AnyIsomer, Array, Dimension, FieldDescriptor, Fields, GraphCloner, Isomer, IsomerError, Kind, classify,
    deep_clone, deep_equal, fields_of, revert_from, revert_optional, revert_shared,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::{Arc, RwLock};

type Shared<T> = Rc<RefCell<T>>;

fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// A person with an address that points back to its owner.
#[derive(Debug, Isomer)]
struct Person {
    name: String,
    age: u32,
    address: Option<Shared<Address>>,
}

#[derive(Debug, Isomer)]
struct Address {
    street: String,
    owner: Weak<RefCell<Person>>,
}

#[derive(Debug, Isomer)]
struct Score {
    total: u32,
    people: Vec<Shared<Person>>,
}

fn person(name: &str, age: u32) -> Shared<Person> {
    shared(Person {
        name: name.to_string(),
        age,
        address: None,
    })
}

#[test]
fn clone_is_independent() {
    let original = person("Ada", 36);
    let copy = deep_clone(&original).unwrap();

    copy.borrow_mut().name = "Grace".to_string();

    assert_eq!(original.borrow().name, "Ada");
    assert_eq!(copy.borrow().age, 36);
}

#[test]
fn back_reference_points_at_clone() {
    let p = person("Ada", 36);
    let address = shared(Address {
        street: "Main St".to_string(),
        owner: Rc::downgrade(&p),
    });
    p.borrow_mut().address = Some(Rc::clone(&address));

    let copy = deep_clone(&p).unwrap();
    let copied_address = copy.borrow().address.clone().unwrap();

    assert!(!Rc::ptr_eq(&copied_address, &address));
    let owner = copied_address.borrow().owner.upgrade().unwrap();
    assert!(Rc::ptr_eq(&owner, &copy));
    assert_eq!(copied_address.borrow().street, "Main St");
}

/// A resident always has a home, and the home points back at its resident.
#[derive(Debug, Isomer)]
struct Resident {
    name: String,
    home: Shared<Home>,
}

#[derive(Debug, Isomer)]
struct Home {
    city: String,
    resident: Weak<RefCell<Resident>>,
}

fn resident(name: &str, city: &str) -> Shared<Resident> {
    let home = shared(Home {
        city: city.to_string(),
        resident: Weak::new(),
    });
    let r = shared(Resident {
        name: name.to_string(),
        home: Rc::clone(&home),
    });
    home.borrow_mut().resident = Rc::downgrade(&r);
    r
}

#[test]
fn required_handle_field_is_cloned() {
    let original = resident("Ada", "London");
    let copy = deep_clone(&original).unwrap();

    let home = Rc::clone(&copy.borrow().home);
    assert!(!Rc::ptr_eq(&home, &original.borrow().home));
    assert_eq!(home.borrow().city, "London");
    let back = home.borrow().resident.upgrade().unwrap();
    assert!(Rc::ptr_eq(&back, &copy));
    assert!(deep_equal(&original, &copy));
}

#[test]
fn weak_only_owner_lives_as_long_as_the_cloner() {
    let owner = resident("Ada", "London");
    let home = Rc::clone(&owner.borrow().home);

    // Nothing in the copied home owns the copied resident.
    let detached = deep_clone(&home).unwrap();
    assert!(detached.borrow().resident.upgrade().is_none());
    assert!(!deep_equal(&home, &detached));

    let mut cloner = GraphCloner::new();
    let kept = cloner.clone_value(&home).unwrap();
    assert_eq!(cloner.tracked(), 2);
    let copied_owner = kept.borrow().resident.upgrade().unwrap();
    assert!(Rc::ptr_eq(&copied_owner.borrow().home, &kept));
    assert!(deep_equal(&home, &kept));
}

#[test]
fn clone_list_of_references() {
    let score = Score {
        total: 10,
        people: vec![person("Ada", 36), person("Alan", 41)],
    };

    let copy = deep_clone(&score).unwrap();

    assert_eq!(copy.total, 10);
    assert_eq!(copy.people.len(), 2);
    for (a, b) in score.people.iter().zip(&copy.people) {
        assert!(!Rc::ptr_eq(a, b));
        assert_eq!(a.borrow().name, b.borrow().name);
    }
    assert!(deep_equal(&score, &copy));
}

#[test]
fn same_node_twice_stays_shared() {
    let ada = person("Ada", 36);
    let score = Score {
        total: 2,
        people: vec![Rc::clone(&ada), Rc::clone(&ada)],
    };

    let copy = deep_clone(&score).unwrap();
    assert!(Rc::ptr_eq(&copy.people[0], &copy.people[1]));
}

#[test]
fn immutable_text_is_not_copied() {
    let text: Rc<str> = Rc::from("unchanged");
    let copy = deep_clone(&text).unwrap();
    assert!(Rc::ptr_eq(&text, &copy));
    assert_eq!(classify::<Rc<str>>(), Kind::Immutable);
}

#[test]
fn equal_until_mutated() {
    let a = person("Ada", 36);
    let b = person("Ada", 36);
    assert!(deep_equal(&a, &b));

    b.borrow_mut().age = 37;
    assert!(!deep_equal(&a, &b));
}

#[test]
fn cyclic_graphs_compare_equal() {
    let build = || {
        let p = person("Ada", 36);
        let address = shared(Address {
            street: "Main St".to_string(),
            owner: Rc::downgrade(&p),
        });
        p.borrow_mut().address = Some(address);
        p
    };

    let a = build();
    let b = build();
    assert!(deep_equal(&a, &b));
    assert!(deep_equal(&a, &deep_clone(&a).unwrap()));
}

#[test]
fn null_handling() {
    let none: Option<Shared<Person>> = None;
    assert!(deep_clone(&none).unwrap().is_none());
    assert!(deep_equal(&none, &None));
    assert!(!deep_equal(&none, &Some(person("Ada", 36))));

    let dead: Weak<RefCell<Person>> = Weak::new();
    assert!(deep_clone(&dead).unwrap().upgrade().is_none());
}

mod bank {
    use isomer_core::Isomer;

    /// Balance changes only through `deposit`.
    #[derive(Debug, Isomer)]
    pub struct Account {
        pub owner: String,
        balance: i64,
        history: Vec<i64>,
    }

    impl Account {
        pub fn open(owner: &str) -> Self {
            Account {
                owner: owner.to_string(),
                balance: 0,
                history: Vec::new(),
            }
        }

        pub fn deposit(&mut self, amount: i64) {
            self.balance += amount;
            self.history.push(amount);
        }

        pub fn balance(&self) -> i64 {
            self.balance
        }

        pub fn history(&self) -> &[i64] {
            &self.history
        }
    }
}

#[test]
fn revert_restores_private_fields() {
    let mut account = bank::Account::open("Ada");
    account.deposit(100);
    let snapshot = deep_clone(&account).unwrap();

    account.deposit(-40);
    account.owner = "Mallory".to_string();

    revert_from(&mut account, &snapshot).unwrap();
    assert_eq!(account.owner, "Ada");
    assert_eq!(account.balance(), 100);
    assert_eq!(account.history(), &[100]);
    assert!(deep_equal(&account, &snapshot));
}

#[test]
fn revert_shared_node_in_place() {
    let tracked = person("Ada", 36);
    let snapshot = deep_clone(&tracked).unwrap();
    let score = Score {
        total: 1,
        people: vec![Rc::clone(&tracked)],
    };

    tracked.borrow_mut().age = 99;
    revert_shared(&tracked, &snapshot).unwrap();

    assert_eq!(score.people[0].borrow().age, 36);
    assert!(!Rc::ptr_eq(&tracked, &snapshot));
}

#[test]
fn revert_replaces_nested_nodes_with_clones() {
    let tracked = person("Ada", 36);
    let snapshot = person("Ada", 36);
    snapshot.borrow_mut().address = Some(shared(Address {
        street: "Elm St".to_string(),
        owner: Weak::new(),
    }));

    revert_optional(Some(&tracked), Some(&snapshot)).unwrap();

    let restored = tracked.borrow().address.clone().unwrap();
    let original = snapshot.borrow().address.clone().unwrap();
    assert!(!Rc::ptr_eq(&restored, &original));
    assert_eq!(restored.borrow().street, "Elm St");
}

#[test]
fn thread_safe_handles() {
    #[derive(Debug, Isomer)]
    struct Counter {
        hits: u64,
        peers: Vec<Arc<RwLock<Counter>>>,
    }

    let a = Arc::new(RwLock::new(Counter { hits: 1, peers: vec![] }));
    let b = Arc::new(RwLock::new(Counter {
        hits: 2,
        peers: vec![Arc::clone(&a)],
    }));
    a.write().unwrap().peers.push(Arc::clone(&b));

    let copy = deep_clone(&b).unwrap();
    let copied_a = Arc::clone(&copy.read().unwrap().peers[0]);
    let back = Arc::clone(&copied_a.read().unwrap().peers[0]);
    assert!(Arc::ptr_eq(&back, &copy));
    assert!(deep_equal(&b, &copy));

    a.write().unwrap().peers.clear();
    copied_a.write().unwrap().peers.clear();
}

#[test]
fn array_keeps_shape_and_bounds() {
    let grid = Array::new(
        vec![Dimension::new(2, 1), Dimension::new(3, -1), Dimension::new(1, 10)],
        (0..6).map(|i| person(&format!("p{i}"), i)).collect(),
    )
    .unwrap();

    let copy = deep_clone(&grid).unwrap();

    assert_eq!(copy.rank(), 3);
    assert_eq!(copy.dimensions(), grid.dimensions());
    for index in grid.indices() {
        let (a, b) = (grid.get(&index).unwrap(), copy.get(&index).unwrap());
        assert!(!Rc::ptr_eq(a, b));
        assert_eq!(a.borrow().name, b.borrow().name);
    }
    assert!(deep_equal(&grid, &copy));
}

#[test]
fn runtime_types_are_discriminated() {
    let values: Vec<Box<dyn AnyIsomer>> = vec![Box::new(1u32), Box::new("one".to_string())];
    let copy = deep_clone(&values).unwrap();

    assert_eq!(copy[0].downcast_ref::<u32>(), Some(&1));
    assert_eq!(copy[1].downcast_ref::<String>().map(String::as_str), Some("one"));
    assert!(deep_equal(&values, &copy));

    let swapped: Vec<Box<dyn AnyIsomer>> = vec![Box::new("one".to_string()), Box::new(1u32)];
    assert!(!deep_equal(&values, &swapped));
}

#[test]
fn enum_variants_are_discriminated() {
    #[derive(Debug, Isomer)]
    enum Shape {
        Circle { radius: f64 },
        Rect(f64, f64),
        Empty,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Isomer)]
    enum Color {
        Red,
        Green,
    }

    let shapes = vec![Shape::Circle { radius: 1.0 }, Shape::Rect(2.0, 3.0), Shape::Empty];
    let copy = deep_clone(&shapes).unwrap();
    assert!(matches!(copy[1], Shape::Rect(w, h) if w == 2.0 && h == 3.0));
    assert!(deep_equal(&shapes, &copy));
    assert!(!deep_equal(&Shape::Circle { radius: 1.0 }, &Shape::Rect(1.0, 1.0)));

    assert_eq!(classify::<Color>(), Kind::Immutable);
    assert_eq!(Color::blank().unwrap(), Color::Red);
    assert!(!deep_equal(&Color::Red, &Color::Green));
}

#[test]
fn inherited_fields_are_copied() {
    #[derive(Debug, Isomer)]
    struct Entity {
        id: u64,
        label: String,
    }

    #[derive(Debug, Isomer)]
    struct Customer {
        #[isomer(base)]
        entity: Entity,
        label: String,
        orders: HashMap<String, u32>,
    }

    let customer = shared(Customer {
        entity: Entity {
            id: 5,
            label: "base".to_string(),
        },
        label: "derived".to_string(),
        orders: HashMap::from([("book".to_string(), 2)]),
    });

    let copy = deep_clone(&customer).unwrap();
    let copy = copy.borrow();
    assert_eq!(copy.entity.id, 5);
    assert_eq!(copy.entity.label, "base");
    assert_eq!(copy.label, "derived");
    assert_eq!(copy.orders["book"], 2);

    assert_eq!(fields_of::<Customer>().len(), 4);
    let base_label = FieldDescriptor::new("Entity", "label");
    assert_eq!(copy.field_as::<String>(&base_label).map(String::as_str), Some("base"));
}

#[test]
fn uninstantiable_node_propagates() {
    #[derive(Debug, Isomer)]
    #[isomer(no_blank)]
    struct Token {
        secret: String,
    }

    #[derive(Debug, Isomer)]
    struct Session {
        user: String,
        token: Shared<Token>,
    }

    let session = Session {
        user: "ada".to_string(),
        token: shared(Token {
            secret: "s3cr3t".to_string(),
        }),
    };

    let err = deep_clone(&session).unwrap_err();
    assert!(matches!(err, IsomerError::Uninstantiable(name) if name.contains("Token")));
    assert!(err.to_string().contains("Token"));
}

#[test]
fn default_attributes_supply_blanks() {
    #[derive(Debug, Default, Isomer)]
    #[isomer(default)]
    struct Config {
        retries: u8,
    }

    #[derive(Debug, Isomer)]
    struct Job {
        name: String,
        #[isomer(default)]
        config: Option<Shared<Config>>,
        #[isomer(skip)]
        scratch: Vec<u8>,
    }

    let job = shared(Job {
        name: "nightly".to_string(),
        config: Some(shared(Config { retries: 3 })),
        scratch: vec![1, 2, 3],
    });

    let copy = deep_clone(&job).unwrap();
    let copy = copy.borrow();
    assert_eq!(copy.name, "nightly");
    assert_eq!(copy.config.as_ref().unwrap().borrow().retries, 3);
    assert!(copy.scratch.is_empty());
}

#[test]
fn opted_in_immutable_type() {
    #[derive(Debug, Clone, PartialEq, Isomer)]
    #[isomer(immutable)]
    struct Money {
        cents: i64,
        currency: &'static str,
    }

    assert_eq!(classify::<Money>(), Kind::Immutable);
    let price = Money {
        cents: 1999,
        currency: "EUR",
    };
    assert_eq!(deep_clone(&price).unwrap(), price);
    assert!(matches!(Money::blank(), Err(IsomerError::Uninstantiable(_))));
}
