use serde_json::json;
use uuid::Uuid;

use crate::common::{MAX_ASSET_SIZE, NewCutOut, PNG, TestApp, id_of, routes};

async fn setup() -> (TestApp, String) {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin", "securepass").await;
    (app, token)
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn stores_the_image_under_the_derived_key() {
        let (app, token) = setup().await;

        let res = app
            .upload_image(
                &NewCutOut {
                    color: "NAVY_BLUE",
                    ..Default::default()
                },
                &token,
            )
            .await;

        assert_eq!(res.body["public_id"], "bone-front-cotton-navy_blue");
        let url = res.body["secure_url"].as_str().unwrap();
        assert!(url.ends_with("/api/v1/assets/bone-front-cotton-navy_blue"));
        assert!(app.asset_path("bone-front-cotton-navy_blue").exists());
    }

    #[tokio::test]
    async fn stored_image_is_served_publicly() {
        let (app, token) = setup().await;
        app.upload_image(&NewCutOut::default(), &token).await;

        let res = app
            .get_without_token(&routes::asset("bone-front-cotton-red"))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn reupload_replaces_the_image() {
        let (app, token) = setup().await;
        app.upload_image(&NewCutOut::default(), &token).await;
        app.upload_image(&NewCutOut::default(), &token).await;

        assert!(app.asset_path("bone-front-cotton-red").exists());
    }

    #[tokio::test]
    async fn requires_a_token() {
        let (app, _) = setup().await;

        let res = app
            .upload_with_token(&[], Some(("a.png", PNG.to_vec())), "bogus")
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn missing_identity_field_is_rejected() {
        let (app, token) = setup().await;

        let res = app
            .upload_with_token(
                &[("product_model", "BONE"), ("cut_type", "FRONT"), ("fabric", "COTTON")],
                Some(("a.png", PNG.to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].as_str().unwrap().contains("color"));
    }

    #[tokio::test]
    async fn missing_image_is_rejected() {
        let (app, token) = setup().await;

        let res = app
            .upload_with_token(
                &[
                    ("product_model", "BONE"),
                    ("cut_type", "FRONT"),
                    ("fabric", "COTTON"),
                    ("color", "RED"),
                ],
                None,
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_enum_value_is_rejected() {
        let (app, token) = setup().await;

        let res = app
            .upload_with_token(
                &[
                    ("product_model", "SOMBRERO"),
                    ("cut_type", "FRONT"),
                    ("fabric", "COTTON"),
                    ("color", "RED"),
                ],
                Some(("a.png", PNG.to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("SOMBRERO"));
    }

    #[tokio::test]
    async fn non_image_file_is_rejected() {
        let (app, token) = setup().await;

        let res = app
            .upload_with_token(
                &[
                    ("product_model", "BONE"),
                    ("cut_type", "FRONT"),
                    ("fabric", "COTTON"),
                    ("color", "RED"),
                ],
                Some(("notes.txt", b"just text".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let (app, token) = setup().await;
        let mut big = PNG.to_vec();
        big.resize(MAX_ASSET_SIZE as usize + 1024, 0);

        let res = app
            .upload_with_token(
                &[
                    ("product_model", "BONE"),
                    ("cut_type", "FRONT"),
                    ("fabric", "COTTON"),
                    ("color", "RED"),
                ],
                Some(("big.png", big)),
                &token,
            )
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(!app.asset_path("bone-front-cotton-red").exists());
    }
}

mod register {
    use super::*;

    #[tokio::test]
    async fn creates_an_active_record_with_derived_key() {
        let (app, token) = setup().await;

        let record = app.create_cut_out(&NewCutOut::default(), &token).await;

        assert_eq!(record["key"], "bone-front-cotton-red");
        assert_eq!(record["status"], "ACTIVE");
        assert_eq!(record["display_order"], 1);
        assert!(record["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn accepts_display_order_as_numeric_string() {
        let (app, token) = setup().await;
        let upload = app.upload_image(&NewCutOut::default(), &token).await;

        let res = app
            .post_with_token(
                routes::CUT_OUTS,
                &json!({
                    "sku": "BN-FR",
                    "product_model": "BONE",
                    "cut_type": "FRONT",
                    "position": "FRONT",
                    "fabric": "COTTON",
                    "color": "RED",
                    "image_url": upload.body["secure_url"],
                    "display_order": "7",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["display_order"], 7);
    }

    #[tokio::test]
    async fn rejects_non_numeric_display_order() {
        let (app, token) = setup().await;

        let res = app
            .post_with_token(
                routes::CUT_OUTS,
                &json!({
                    "sku": "BN-FR",
                    "product_model": "BONE",
                    "cut_type": "FRONT",
                    "position": "FRONT",
                    "fabric": "COTTON",
                    "color": "RED",
                    "image_url": "http://cdn/x",
                    "display_order": "top",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn same_identity_twice_is_a_duplicate() {
        let (app, token) = setup().await;
        let first = app.create_cut_out(&NewCutOut::default(), &token).await;

        let res = app
            .post_with_token(
                routes::CUT_OUTS,
                &json!({
                    "sku": "OTHER",
                    "product_model": "BONE",
                    "cut_type": "FRONT",
                    "position": "BACK",
                    "fabric": "COTTON",
                    "color": "RED",
                    "image_url": first["image_url"],
                    "display_order": 2,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_KEY");
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn lists_newest_first() {
        let (app, token) = setup().await;
        let red = app.create_cut_out(&NewCutOut::default(), &token).await;
        let blue = app
            .create_cut_out(
                &NewCutOut {
                    color: "BLUE",
                    ..Default::default()
                },
                &token,
            )
            .await;

        let res = app.get_with_token(routes::CUT_OUTS, &token).await;

        assert_eq!(res.status, 200);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], blue["id"]);
        assert_eq!(list[1]["id"], red["id"]);
    }

    #[tokio::test]
    async fn gets_one_by_id() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;

        let res = app
            .get_with_token(&routes::cut_out(id_of(&record)), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.id(), id_of(&record));
        assert_eq!(res.body["key"], "bone-front-cotton-red");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (app, token) = setup().await;

        let res = app
            .get_with_token(&routes::cut_out(Uuid::new_v4()), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn listing_requires_a_token() {
        let (app, _) = setup().await;

        let res = app.get_without_token(routes::CUT_OUTS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn options_list_every_value_with_labels() {
        let (app, token) = setup().await;

        let res = app.get_with_token(routes::OPTIONS, &token).await;

        assert_eq!(res.status, 200);
        let colors = res.body["colors"].as_array().unwrap();
        assert!(colors.contains(&json!({"value": "NAVY_BLUE", "label": "Navy Blue"})));
        assert_eq!(res.body["statuses"].as_array().unwrap().len(), 2);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn color_change_moves_the_image() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;
        let id = id_of(&record);

        let res = app
            .put_with_token(
                &routes::cut_out_by_query(id),
                &json!({"color": "BLUE"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["key"], "bone-front-cotton-blue");
        assert_eq!(res.body["color"], "BLUE");
        assert!(
            res.body["image_url"]
                .as_str()
                .unwrap()
                .ends_with("/bone-front-cotton-blue")
        );
        assert!(app.asset_path("bone-front-cotton-blue").exists());
        assert!(!app.asset_path("bone-front-cotton-red").exists());

        let served = app
            .get_without_token(&routes::asset("bone-front-cotton-blue"))
            .await;
        assert_eq!(served.status, 200);
    }

    #[tokio::test]
    async fn non_identity_change_keeps_the_key() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;

        let res = app
            .put_with_token(
                &routes::cut_out_by_query(id_of(&record)),
                &json!({"sku": "NEW-SKU", "display_order": 5, "status": "INACTIVE"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["sku"], "NEW-SKU");
        assert_eq!(res.body["display_order"], 5);
        assert_eq!(res.body["status"], "INACTIVE");
        assert_eq!(res.body["key"], record["key"]);
        assert_eq!(res.body["image_url"], record["image_url"]);
        assert!(app.asset_path("bone-front-cotton-red").exists());
    }

    #[tokio::test]
    async fn taken_target_key_is_a_conflict() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;
        // an image already sits at the target key
        app.upload_image(
            &NewCutOut {
                color: "BLUE",
                ..Default::default()
            },
            &token,
        )
        .await;

        let res = app
            .put_with_token(
                &routes::cut_out_by_query(id_of(&record)),
                &json!({"color": "BLUE"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "KEY_CONFLICT");

        let unchanged = app
            .get_with_token(&routes::cut_out(id_of(&record)), &token)
            .await;
        assert_eq!(unchanged.body["key"], "bone-front-cotton-red");
        assert_eq!(unchanged.body["color"], "RED");
        assert!(app.asset_path("bone-front-cotton-red").exists());
    }

    #[tokio::test]
    async fn missing_image_is_reported() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;
        std::fs::remove_file(app.asset_path("bone-front-cotton-red")).unwrap();

        let res = app
            .put_with_token(
                &routes::cut_out_by_query(id_of(&record)),
                &json!({"fabric": "DENIM"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "ASSET_MISSING");
    }

    #[tokio::test]
    async fn duplicate_record_after_rename_restores_the_image() {
        let (app, token) = setup().await;
        let red = app.create_cut_out(&NewCutOut::default(), &token).await;
        app.create_cut_out(
            &NewCutOut {
                color: "BLUE",
                ..Default::default()
            },
            &token,
        )
        .await;
        // the blue record exists but its image does not, so the rename
        // succeeds and the database write hits the unique key
        std::fs::remove_file(app.asset_path("bone-front-cotton-blue")).unwrap();

        let res = app
            .put_with_token(
                &routes::cut_out_by_query(id_of(&red)),
                &json!({"color": "BLUE"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 409, "{}", res.text);
        assert_eq!(res.body["code"], "DUPLICATE_KEY");
        assert!(app.asset_path("bone-front-cotton-red").exists());
        assert!(!app.asset_path("bone-front-cotton-blue").exists());
    }

    #[tokio::test]
    async fn missing_id_is_an_invalid_request() {
        let (app, token) = setup().await;

        let res = app
            .put_with_token(routes::CUT_OUTS, &json!({"color": "BLUE"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let (app, token) = setup().await;

        let res = app
            .put_with_token(
                &format!("{}?id=not-a-uuid", routes::CUT_OUTS),
                &json!({"color": "BLUE"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (app, token) = setup().await;

        let res = app
            .put_with_token(
                &routes::cut_out_by_query(Uuid::new_v4()),
                &json!({"color": "BLUE"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_enum_value_is_rejected() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;

        let res = app
            .put_with_token(
                &routes::cut_out_by_query(id_of(&record)),
                &json!({"color": "PLAID"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_record_and_image() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;
        let id = id_of(&record);

        let res = app
            .delete_with_token(&routes::cut_out_by_query(id), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["deleted"]["id"], record["id"]);
        assert!(!app.asset_path("bone-front-cotton-red").exists());

        let gone = app.get_with_token(&routes::cut_out(id), &token).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn succeeds_when_image_is_already_gone() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;
        std::fs::remove_file(app.asset_path("bone-front-cotton-red")).unwrap();

        let res = app
            .delete_with_token(&routes::cut_out_by_query(id_of(&record)), &token)
            .await;

        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;
        let path = routes::cut_out_by_query(id_of(&record));

        app.delete_with_token(&path, &token).await;
        let res = app.delete_with_token(&path, &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn missing_id_is_an_invalid_request() {
        let (app, token) = setup().await;

        let res = app.delete_with_token(routes::CUT_OUTS, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_REQUEST");
    }
}

mod preview {
    use super::*;

    #[tokio::test]
    async fn layers_are_ordered_back_to_front() {
        let (app, token) = setup().await;
        let brim = app
            .create_cut_out(
                &NewCutOut {
                    cut_type: "BRIM",
                    display_order: 3,
                    ..Default::default()
                },
                &token,
            )
            .await;
        let front = app
            .create_cut_out(
                &NewCutOut {
                    display_order: 1,
                    ..Default::default()
                },
                &token,
            )
            .await;
        let mesh = app
            .create_cut_out(
                &NewCutOut {
                    cut_type: "MESH",
                    display_order: 2,
                    ..Default::default()
                },
                &token,
            )
            .await;

        let res = app
            .get_with_token(
                &routes::preview(&[id_of(&brim), id_of(&front), id_of(&mesh)]),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let layers = res.body["layers"].as_array().unwrap();
        let keys: Vec<&str> = layers.iter().map(|l| l["key"].as_str().unwrap()).collect();
        assert_eq!(
            keys,
            [
                "bone-front-cotton-red",
                "bone-mesh-cotton-red",
                "bone-brim-cotton-red"
            ]
        );
        assert_eq!(layers[2]["z_index"], 3);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;

        let res = app
            .get_with_token(&routes::preview(&[id_of(&record), Uuid::new_v4()]), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let (app, token) = setup().await;
        let record = app.create_cut_out(&NewCutOut::default(), &token).await;
        let id = id_of(&record);

        let res = app.get_with_token(&routes::preview(&[id, id]), &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
