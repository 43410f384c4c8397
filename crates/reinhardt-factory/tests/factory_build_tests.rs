//! Build behavior of cat factories: attributes, options, sequences,
//! after-callbacks and lists.

use reinhardt_factory::prelude::*;
use rstest::*;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Deserialize, PartialEq)]
struct Cat {
	name: String,
	sound: String,
}

#[fixture]
fn sequenced_cats() -> Factory {
	Factory::create()
		.sequence("name", |n, _| Ok(format!("Cat #{}", n + 1)))
		.attr("sound", |_| Ok("meow"))
}

fn age_from_birth_year(ev: &Evaluator) -> FactoryResult<i64> {
	Ok(2019 - ev.get_as::<i64>("birth_year")?)
}

#[rstest]
fn test_create_returns_empty_factory() {
	let factory = Factory::create();
	assert!(factory.attributes().is_empty());
	assert_eq!(factory.callback_count(), 0);
	assert_eq!(factory.build().unwrap(), json!({}));
}

#[rstest]
fn test_compose_combines_factories() {
	let cat_factory = Factory::new().attr("name", |_| Ok("Bibi"));
	let spider_factory = Factory::new().attr("can_it_swing", |_| Ok(true));

	let spider_cat = Factory::compose_all([&cat_factory, &spider_factory]).build().unwrap();

	assert_eq!(spider_cat, json!({ "name": "Bibi", "can_it_swing": true }));
}

#[rstest]
fn test_builds_object_with_set_attributes() {
	let cat = Factory::new()
		.attr("name", |_| Ok("Bibi"))
		.attr("age", |_| Ok(3))
		.build()
		.unwrap();

	assert_eq!(cat, json!({ "name": "Bibi", "age": 3 }));
}

#[rstest]
fn test_builds_object_with_attribute_overrides() {
	let cat = Factory::new()
		.attr("name", |_| Ok("Bibi"))
		.attr("age", |_| Ok(3))
		.build_with(Overrides::new().set("age", 4))
		.unwrap();

	assert_eq!(cat, json!({ "name": "Bibi", "age": 4 }));
}

#[rstest]
fn test_passes_options_to_attribute_definition() {
	let cat = Factory::new()
		.option("birth_year", |_| Ok(2017))
		.attr("name", |_| Ok("Bibi"))
		.attr("age", age_from_birth_year)
		.build()
		.unwrap();

	assert_eq!(cat, json!({ "name": "Bibi", "age": 2 }));
}

#[rstest]
fn test_passes_attributes_to_attribute_definition() {
	let cat = Factory::new()
		.attr("name", |_| Ok("Bibi"))
		.attr("full_name", |ev| {
			Ok(format!("{} The Cat", ev.get_as::<String>("name")?))
		})
		.build()
		.unwrap();

	assert_eq!(cat, json!({ "name": "Bibi", "full_name": "Bibi The Cat" }));
}

#[rstest]
fn test_passes_sequences_to_attribute_definition() {
	let cat = Factory::new()
		.sequence("name", |n, _| Ok(format!("Cat #{}", n + 1)))
		.attr("full_name", |ev| {
			Ok(format!("{} Potato", ev.get_as::<String>("name")?))
		})
		.build()
		.unwrap();

	assert_eq!(cat, json!({ "name": "Cat #1", "full_name": "Cat #1 Potato" }));
}

#[rstest]
fn test_increments_sequence_on_every_build() {
	let cat_factory = Factory::new().sequence("name", |n, _| Ok(format!("Cat #{}", n + 1)));

	let cat = cat_factory.build().unwrap();
	let another_cat = cat_factory.build().unwrap();

	assert_eq!(cat, json!({ "name": "Cat #1" }));
	assert_eq!(another_cat, json!({ "name": "Cat #2" }));
}

#[rstest]
fn test_uses_option_overrides_to_build_object() {
	let cat = Factory::new()
		.option("birth_year", |_| Ok(2017))
		.attr("name", |_| Ok("Bibi"))
		.attr("age", age_from_birth_year)
		.build_with(Overrides::new().set("birth_year", 2016))
		.unwrap();

	assert_eq!(cat, json!({ "name": "Bibi", "age": 3 }));
}

#[rstest]
fn test_after_callback_returns_modified_object() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);

	let cat = Factory::new()
		.attr("name", |_| Ok("Bibi"))
		.option("hungry", |_| Ok(true))
		.after(move |cat, ev| {
			counter.fetch_add(1, Ordering::SeqCst);
			if ev.get_as::<bool>("hungry")? {
				Ok(Some(cat.clone().with("meowing", true)))
			} else {
				Ok(Some(cat.clone()))
			}
		})
		.build()
		.unwrap();

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(cat, json!({ "name": "Bibi", "meowing": true }));
}

#[rstest]
fn test_after_callback_returning_nothing_keeps_object() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);

	let cat = Factory::new()
		.attr("name", |_| Ok("Bibi"))
		.option("hungry", |_| Ok(true))
		.after(move |_, _| {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(None)
		})
		.build()
		.unwrap();

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(cat, json!({ "name": "Bibi" }));
}

#[rstest]
fn test_after_mut_edits_object_in_place() {
	let cat = Factory::new()
		.attr("name", |_| Ok("Bibi"))
		.option("hungry", |_| Ok(true))
		.after_mut(|cat, ev| {
			if ev.get_as::<bool>("hungry")? {
				cat.insert("meowing", true);
			}
			Ok(())
		})
		.build()
		.unwrap();

	assert_eq!(cat, json!({ "name": "Bibi", "meowing": true }));
}

#[rstest]
fn test_after_callbacks_run_in_order_added() {
	let cat = Factory::new()
		.attr("name", |_| Ok("Bibi"))
		.option("hungry", |_| Ok(true))
		.after(|cat, ev| {
			Ok(ev
				.get_as::<bool>("hungry")?
				.then(|| cat.clone().with("meowing", true)))
		})
		.after(|cat, _| {
			let meowing = cat.get("meowing").and_then(|v| v.as_bool()).unwrap_or(false);
			let name = cat.get("name").and_then(|v| v.as_str()).unwrap_or_default();
			Ok(meowing.then(|| cat.clone().with("name", format!("Meowing {}", name))))
		})
		.build()
		.unwrap();

	assert_eq!(cat, json!({ "name": "Meowing Bibi", "meowing": true }));
}

#[rstest]
fn test_build_list_builds_entities(sequenced_cats: Factory) {
	let cats = sequenced_cats.build_list(3).unwrap();

	assert_eq!(
		cats,
		vec![
			json!({ "name": "Cat #1", "sound": "meow" }),
			json!({ "name": "Cat #2", "sound": "meow" }),
			json!({ "name": "Cat #3", "sound": "meow" }),
		]
	);
}

#[rstest]
fn test_build_list_continues_after_build(sequenced_cats: Factory) {
	sequenced_cats.build().unwrap();
	let cats = sequenced_cats.build_list(2).unwrap();
	let next = sequenced_cats.build().unwrap();

	assert_eq!(cats[0].get("name"), Some(&json!("Cat #2")));
	assert_eq!(cats[1].get("name"), Some(&json!("Cat #3")));
	assert_eq!(next.get("name"), Some(&json!("Cat #4")));
}

#[rstest]
fn test_build_list_threads_overrides(sequenced_cats: Factory) {
	let cats = sequenced_cats
		.build_list_with(2, Overrides::new().set("sound", "purr"))
		.unwrap();

	assert!(cats.iter().all(|cat| cat.get("sound") == Some(&json!("purr"))));
	assert_eq!(cats[1].get("name"), Some(&json!("Cat #2")));
}

#[rstest]
fn test_build_list_of_zero(sequenced_cats: Factory) {
	assert!(sequenced_cats.build_list(0).unwrap().is_empty());
	assert_eq!(
		sequenced_cats.build().unwrap().get("name"),
		Some(&json!("Cat #1"))
	);
}

#[rstest]
fn test_build_as_model(sequenced_cats: Factory) {
	let cat: Cat = sequenced_cats.build_as().unwrap();
	let more: Vec<Cat> = sequenced_cats.build_list_as(2).unwrap();

	assert_eq!(
		cat,
		Cat {
			name: "Cat #1".to_string(),
			sound: "meow".to_string(),
		}
	);
	assert_eq!(more[1].name, "Cat #3");
}

#[rstest]
fn test_driver_iterates_on_demand(sequenced_cats: Factory) {
	let names: Vec<String> = sequenced_cats
		.driver(BuildArgs::new())
		.unwrap()
		.into_iter()
		.take(4)
		.map(|cat| cat.unwrap().deserialize::<Cat>().unwrap().name)
		.collect();

	assert_eq!(names, ["Cat #1", "Cat #2", "Cat #3", "Cat #4"]);
}
