use reqwest::multipart::Form;
use sea_orm::{EntityTrait, PaginatorTrait};
use server::entity::video;
use serde_json::json;

use crate::common::{
    MAX_UPLOAD_SIZE, TestApp, file_part, minimal_mp4, png_bytes, routes, video_form,
};

const MISSING_ID: &str = "0192f0c1-9e2b-7c3d-8e4f-5a6b7c8d9e0f";

mod publish {
    use super::*;

    #[tokio::test]
    async fn publish_stores_both_files_and_reads_duration() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app.publish_video(&alice.token, "My first clip").await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["statusCode"], 201);
        assert_eq!(res.body["message"], "Video published successfully");
        let data = &res.body["data"];
        assert_eq!(data["title"], "My first clip");
        assert_eq!(data["description"], "A description");
        assert_eq!(data["duration"], 30.0);
        assert_eq!(data["isPublished"], true);
        assert_eq!(data["owner"]["id"], alice.id.as_str());

        let video_url = data["videoFile"].as_str().unwrap();
        let thumbnail_url = data["thumbnail"].as_str().unwrap();
        assert!(video_url.ends_with(".mp4"));
        assert!(thumbnail_url.ends_with(".png"));
        assert!(app.store.has_object(video_url));
        assert!(app.store.has_object(thumbnail_url));
        assert_eq!(app.store.objects().len(), 2);
    }

    #[tokio::test]
    async fn published_media_is_served() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let res = app.publish_video(&alice.token, "Served").await;
        let thumbnail_url = res.body["data"]["thumbnail"].as_str().unwrap();

        let served = app.client.get(thumbnail_url).send().await.unwrap();

        assert_eq!(served.status(), 200);
        assert_eq!(served.bytes().await.unwrap().as_ref(), png_bytes().as_slice());
    }

    #[tokio::test]
    async fn unreadable_video_gets_null_duration() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let form = Form::new()
            .text("title", "Raw")
            .text("description", "Not really an mp4")
            .part("videoFile", file_part(b"garbage".to_vec(), "raw.mp4", "video/mp4"))
            .part("thumbnail", file_part(png_bytes(), "t.png", "image/png"));
        let res = app.post_multipart(routes::VIDEOS, form, &alice.token).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["data"]["duration"].is_null());
    }

    #[tokio::test]
    async fn missing_thumbnail_is_rejected_without_storing() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let form = Form::new()
            .text("title", "Clip")
            .text("description", "No thumbnail")
            .part(
                "videoFile",
                file_part(minimal_mp4(1000, 5000), "clip.mp4", "video/mp4"),
            );
        let res = app.post_multipart(routes::VIDEOS, form, &alice.token).await;

        res.assert_error(400, "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Video file and thumbnail are required");
        assert_eq!(app.store.upload_attempts(), 0);
        assert!(app.store.objects().is_empty());
    }

    #[tokio::test]
    async fn empty_file_counts_as_missing() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let form = Form::new()
            .text("title", "Clip")
            .text("description", "Empty thumbnail")
            .part(
                "videoFile",
                file_part(minimal_mp4(1000, 5000), "clip.mp4", "video/mp4"),
            )
            .part("thumbnail", file_part(Vec::new(), "t.png", "image/png"));
        let res = app.post_multipart(routes::VIDEOS, form, &alice.token).await;

        res.assert_error(400, "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Video file and thumbnail are required");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .post_multipart(routes::VIDEOS, video_form("   ", "desc"), &alice.token)
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Title is required");
        assert!(app.store.objects().is_empty());
    }

    #[tokio::test]
    async fn wrong_thumbnail_kind_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let form = Form::new()
            .text("title", "Clip")
            .text("description", "Text thumbnail")
            .part(
                "videoFile",
                file_part(minimal_mp4(1000, 5000), "clip.mp4", "video/mp4"),
            )
            .part("thumbnail", file_part(b"hello".to_vec(), "notes.txt", "text/plain"));
        let res = app.post_multipart(routes::VIDEOS, form, &alice.token).await;

        res.assert_error(400, "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "thumbnail must be an image file");
        assert!(app.store.objects().is_empty());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let form = Form::new()
            .text("title", "Big")
            .text("description", "Too large")
            .part(
                "videoFile",
                file_part(vec![0u8; MAX_UPLOAD_SIZE as usize + 1], "big.mp4", "video/mp4"),
            )
            .part("thumbnail", file_part(png_bytes(), "t.png", "image/png"));
        let res = app.post_multipart(routes::VIDEOS, form, &alice.token).await;

        res.assert_error(400, "VALIDATION_ERROR");
        assert!(app.store.objects().is_empty());
    }

    #[tokio::test]
    async fn thumbnail_upload_failure_discards_uploaded_video() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        app.store.fail_uploads_after(1);

        let res = app.publish_video(&alice.token, "Doomed").await;

        res.assert_error(500, "INTERNAL_ERROR");
        assert_eq!(app.store.upload_attempts(), 2);
        assert!(app.store.objects().is_empty());

        let rows = video::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn non_multipart_body_is_validation_error() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .post_with_token(routes::VIDEOS, &json!({"title": "json"}), &alice.token)
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn requires_token() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(app.url(routes::VIDEOS))
            .multipart(video_form("t", "d"))
            .send()
            .await
            .unwrap();
        let res = crate::common::TestResponse::from_response(res).await;

        res.assert_error(401, "TOKEN_MISSING");
        assert!(app.store.objects().is_empty());
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn get_by_id() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_video(&alice.token, "Hello").await;

        let res = app.get_with_token(&routes::video(&id), &bob.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["id"], id.as_str());
        assert_eq!(res.body["data"]["owner"]["username"], "alice");
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app.get_with_token(&routes::video("abc"), &alice.token).await;
        res.assert_error(400, "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Invalid video ID");

        let res = app.get_with_token(&routes::video(MISSING_ID), &alice.token).await;
        res.assert_error(404, "NOT_FOUND");
        assert_eq!(res.body["message"], "Video not found");
    }
}

mod listing {
    use super::*;

    async fn titles(app: &TestApp, query: &str, token: &str) -> Vec<String> {
        let res = app
            .get_with_token(&format!("{}?{query}", routes::VIDEOS), token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        res.body["data"]["videos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn defaults_to_oldest_first() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        for title in ["one", "two", "three"] {
            app.create_video(&alice.token, title).await;
        }

        let res = app.get_with_token(routes::VIDEOS, &alice.token).await;

        assert_eq!(res.body["message"], "Videos fetched successfully");
        assert_eq!(titles(&app, "", &alice.token).await, ["one", "two", "three"]);
        let pagination = &res.body["data"]["pagination"];
        assert_eq!(pagination["page"], 1);
        assert_eq!(pagination["limit"], 10);
        assert_eq!(pagination["total"], 3);
        assert_eq!(pagination["totalPages"], 1);
    }

    #[tokio::test]
    async fn sorts_by_title_descending() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        for title in ["banana", "apple", "cherry"] {
            app.create_video(&alice.token, title).await;
        }

        assert_eq!(
            titles(&app, "sortBy=title&sortType=desc", &alice.token).await,
            ["cherry", "banana", "apple"]
        );
        assert_eq!(
            titles(&app, "sortBy=title&sortType=whatever", &alice.token).await,
            ["apple", "banana", "cherry"]
        );
    }

    #[tokio::test]
    async fn unknown_sort_column_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .get_with_token(&format!("{}?sortBy=password", routes::VIDEOS), &alice.token)
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn query_matches_titles_case_insensitively() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        for title in ["Cooking Pasta", "Pasta night", "Gardening"] {
            app.create_video(&alice.token, title).await;
        }

        assert_eq!(
            titles(&app, "query=PASTA", &alice.token).await,
            ["Cooking Pasta", "Pasta night"]
        );
    }

    #[tokio::test]
    async fn query_wildcards_are_literal() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        for title in ["100% real", "plain"] {
            app.create_video(&alice.token, title).await;
        }

        assert_eq!(titles(&app, "query=%25", &alice.token).await, ["100% real"]);
    }

    #[tokio::test]
    async fn filters_by_owner() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        app.create_video(&alice.token, "alice's").await;
        app.create_video(&bob.token, "bob's").await;

        assert_eq!(
            titles(&app, &format!("userId={}", bob.id), &alice.token).await,
            ["bob's"]
        );

        let res = app
            .get_with_token(&format!("{}?userId=bad", routes::VIDEOS), &alice.token)
            .await;
        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        for title in ["a", "b", "c"] {
            app.create_video(&alice.token, title).await;
        }

        assert_eq!(titles(&app, "page=2&limit=2", &alice.token).await, ["c"]);
        assert!(titles(&app, "page=5&limit=2", &alice.token).await.is_empty());

        let res = app
            .get_with_token(&format!("{}?page=-1", routes::VIDEOS), &alice.token)
            .await;
        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn huge_page_numbers_are_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        app.create_video(&alice.token, "only").await;

        for query in [
            "page=9223372036854775807&limit=10",
            "page=1000000000000000000&limit=100",
            "page=99999999999999999999",
            "limit=99999999999999999999",
        ] {
            let res = app
                .get_with_token(&format!("{}?{query}", routes::VIDEOS), &alice.token)
                .await;
            res.assert_error(400, "VALIDATION_ERROR");
        }

        let res = app
            .get_with_token(
                &format!("{}?page=9223372036854775807&limit=1", routes::VIDEOS),
                &alice.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"]["videos"].as_array().unwrap().is_empty());
        assert_eq!(res.body["data"]["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn huge_page_numbers_are_rejected_on_every_list() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let query = "?page=9223372036854775807&limit=10";

        for path in [
            routes::user_tweets(&alice.id),
            routes::subscribers(&alice.id),
            routes::channels(&alice.id),
        ] {
            let res = app.get_with_token(&format!("{path}{query}"), &alice.token).await;
            res.assert_error(400, "VALIDATION_ERROR");
        }
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn metadata_only_keeps_thumbnail() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let published = app.publish_video(&alice.token, "Before").await;
        let id = published.id();
        let thumbnail = published.body["data"]["thumbnail"].clone();

        let form = Form::new().text("title", "After");
        let res = app
            .patch_multipart(&routes::video(&id), form, &alice.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Video updated successfully");
        assert_eq!(res.body["data"]["title"], "After");
        assert_eq!(res.body["data"]["description"], "A description");
        assert_eq!(res.body["data"]["thumbnail"], thumbnail);
        assert_eq!(app.store.objects().len(), 2);
    }

    #[tokio::test]
    async fn new_thumbnail_replaces_old_object() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let published = app.publish_video(&alice.token, "Clip").await;
        let id = published.id();
        let old = published.body["data"]["thumbnail"].as_str().unwrap().to_string();

        let form = Form::new().part("thumbnail", file_part(png_bytes(), "new.jpg", "image/jpeg"));
        let res = app
            .patch_multipart(&routes::video(&id), form, &alice.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new = res.body["data"]["thumbnail"].as_str().unwrap();
        assert_ne!(new, old);
        assert!(new.ends_with(".jpg"));
        assert!(app.store.has_object(new));
        assert!(!app.store.has_object(&old));
        assert_eq!(app.store.objects().len(), 2);
    }

    #[tokio::test]
    async fn failed_thumbnail_upload_leaves_video_untouched() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let published = app.publish_video(&alice.token, "Original").await;
        let id = published.id();
        let before = published.body["data"].clone();
        app.store.fail_uploads_after(0);

        let form = Form::new()
            .text("title", "Changed")
            .part("thumbnail", file_part(png_bytes(), "new.png", "image/png"));
        let res = app
            .patch_multipart(&routes::video(&id), form, &alice.token)
            .await;

        res.assert_error(500, "INTERNAL_ERROR");
        let after = app.get_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(after.body["data"], before);
        assert!(app.store.has_object(before["thumbnail"].as_str().unwrap()));
        assert_eq!(app.store.objects().len(), 2);
    }

    #[tokio::test]
    async fn retire_failure_still_succeeds() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let published = app.publish_video(&alice.token, "Clip").await;
        let id = published.id();
        let old = published.body["data"]["thumbnail"].as_str().unwrap().to_string();
        app.store.set_fail_deletes(true);

        let form = Form::new().part("thumbnail", file_part(png_bytes(), "new.png", "image/png"));
        let res = app
            .patch_multipart(&routes::video(&id), form, &alice.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_ne!(res.body["data"]["thumbnail"], old.as_str());
        assert!(app.store.has_object(&old));
    }

    #[tokio::test]
    async fn non_owner_is_denied_before_upload() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_video(&alice.token, "Alice's").await;
        let attempts = app.store.upload_attempts();

        let form = Form::new()
            .text("title", "Bob's now")
            .part("thumbnail", file_part(png_bytes(), "t.png", "image/png"));
        let res = app.patch_multipart(&routes::video(&id), form, &bob.token).await;

        res.assert_error(403, "PERMISSION_DENIED");
        assert_eq!(app.store.upload_attempts(), attempts);
        let after = app.get_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(after.body["data"]["title"], "Alice's");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Keep").await;

        let form = Form::new().text("title", " ");
        let res = app
            .patch_multipart(&routes::video(&id), form, &alice.token)
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_record_and_objects() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Gone").await;

        let res = app.delete_with_token(&routes::video(&id), &alice.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"], json!({}));
        assert_eq!(res.body["message"], "Video deleted successfully");
        assert!(app.store.objects().is_empty());
        let res = app.get_with_token(&routes::video(&id), &alice.token).await;
        res.assert_error(404, "NOT_FOUND");
    }

    #[tokio::test]
    async fn storage_failure_rolls_back_and_retry_converges() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Sticky").await;
        app.store.set_fail_deletes(true);

        let res = app.delete_with_token(&routes::video(&id), &alice.token).await;

        res.assert_error(500, "INTERNAL_ERROR");
        let still = app.get_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(still.status, 200);
        assert_eq!(app.store.objects().len(), 2);

        app.store.set_fail_deletes(false);
        let res = app.delete_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(app.store.objects().is_empty());
    }

    #[tokio::test]
    async fn already_missing_objects_do_not_block_delete() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let published = app.publish_video(&alice.token, "Half gone").await;
        let id = published.id();
        let video_url = published.body["data"]["videoFile"].as_str().unwrap();
        let name = video_url.rsplit('/').next().unwrap();
        std::fs::remove_file(app.store.root().join(name)).unwrap();

        let res = app.delete_with_token(&routes::video(&id), &alice.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(app.store.objects().is_empty());
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_video(&alice.token, "Mine").await;

        let res = app.delete_with_token(&routes::video(&id), &bob.token).await;

        res.assert_error(403, "PERMISSION_DENIED");
        assert_eq!(app.store.objects().len(), 2);
    }

    #[tokio::test]
    async fn malformed_id_deletes_nothing() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        app.create_video(&alice.token, "Safe").await;

        let res = app.delete_with_token(&routes::video("1"), &alice.token).await;

        res.assert_error(400, "VALIDATION_ERROR");
        assert_eq!(app.store.objects().len(), 2);
    }
}

mod publish_flag {
    use super::*;

    #[tokio::test]
    async fn toggle_flips_each_time() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Flip").await;

        let res = app.patch_empty(&routes::video_publish(&id), &alice.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Video publish status toggled successfully");
        assert_eq!(res.body["data"]["isPublished"], false);

        let res = app.patch_empty(&routes::video_publish(&id), &alice.token).await;
        assert_eq!(res.body["data"]["isPublished"], true);
    }

    #[tokio::test]
    async fn non_owner_cannot_toggle() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_video(&alice.token, "Flip").await;

        let res = app.patch_empty(&routes::video_publish(&id), &bob.token).await;

        res.assert_error(403, "PERMISSION_DENIED");
        let res = app.get_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(res.body["data"]["isPublished"], true);
    }
}
