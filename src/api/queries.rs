//! # Queries and Mutations
//!
//! Builders for every operation the screens issue. Each returns a
//! [`GqlRequest`]; nothing here touches the network.

use serde_json::json;

use super::GqlRequest;

pub fn me() -> GqlRequest {
    GqlRequest {
        operation: "Me",
        query: "query Me { me { id username name pro books_count } }",
        variables: json!({}),
    }
}

/// The user's library, newest first. `status = None` means every status.
pub fn user_books(user_id: i64, status_id: Option<i64>, limit: usize, offset: usize) -> GqlRequest {
    let mut filter = json!({ "user_id": { "_eq": user_id } });
    if let Some(status) = status_id {
        filter["status_id"] = json!({ "_eq": status });
    }
    GqlRequest {
        operation: "UserBooks",
        query: "query UserBooks($where: user_books_bool_exp, $limit: Int, $offset: Int) { \
                user_books(where: $where, order_by: {updated_at: desc}, limit: $limit, offset: $offset) { \
                id book_id status_id rating \
                book { id title subtitle pages rating release_year contributions { author { name } } } } }",
        variables: json!({ "where": filter, "limit": limit, "offset": offset }),
    }
}

pub fn search_books(text: &str, limit: usize) -> GqlRequest {
    GqlRequest {
        operation: "SearchBooks",
        query: "query SearchBooks($pattern: String!, $limit: Int) { \
                books(where: {title: {_ilike: $pattern}}, order_by: {users_count: desc}, limit: $limit) { \
                id title subtitle pages rating release_year contributions { author { name } } } }",
        variables: json!({ "pattern": format!("%{}%", text.trim()), "limit": limit }),
    }
}

pub fn book_by_id(book_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "BookById",
        query: "query BookById($id: Int!) { \
                books_by_pk(id: $id) { id title subtitle description pages rating release_year \
                contributions { author { name } } } }",
        variables: json!({ "id": book_id }),
    }
}

/// The user's library row for one book, if they have one.
pub fn user_book_for(user_id: i64, book_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "UserBookFor",
        query: "query UserBookFor($user: Int!, $book: Int!) { \
                user_books(where: {user_id: {_eq: $user}, book_id: {_eq: $book}}, limit: 1) { \
                id book_id status_id rating review book { id title pages } \
                user_book_reads(order_by: {id: desc}, limit: 1) { \
                id progress_pages started_at finished_at } } }",
        variables: json!({ "user": user_id, "book": book_id }),
    }
}

pub fn book_tags(book_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "BookTags",
        query: "query BookTags($id: Int!) { \
                taggings(where: {book_id: {_eq: $id}, tag: {tag_category: {slug: {_eq: \"genre\"}}}}, limit: 20) { \
                tag: tag_name } }",
        variables: json!({ "id": book_id }),
    }
}

pub fn book_reviews(book_id: i64, limit: usize) -> GqlRequest {
    GqlRequest {
        operation: "BookReviews",
        query: "query BookReviews($id: Int!, $limit: Int) { \
                user_books(where: {book_id: {_eq: $id}, has_review: {_eq: true}}, \
                order_by: {likes_count: desc}, limit: $limit) { \
                id rating review user { username } } }",
        variables: json!({ "id": book_id, "limit": limit }),
    }
}

/// Cover metadata only; fetched separately so a slow image host never holds
/// up the book itself.
pub fn book_cover(book_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "BookCover",
        query: "query BookCover($id: Int!) { \
                books_by_pk(id: $id) { image { url width height } } }",
        variables: json!({ "id": book_id }),
    }
}

/// The user's journal for one book, newest first.
pub fn book_journals(user_id: i64, book_id: i64, limit: usize) -> GqlRequest {
    GqlRequest {
        operation: "BookJournals",
        query: "query BookJournals($user: Int!, $book: Int!, $limit: Int) { \
                reading_journals(where: {user_id: {_eq: $user}, book_id: {_eq: $book}}, \
                order_by: {action_at: desc}, limit: $limit) { \
                id event entry action_at } }",
        variables: json!({ "user": user_id, "book": book_id, "limit": limit }),
    }
}

pub fn lists(user_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "Lists",
        query: "query Lists($user: Int!) { \
                lists(where: {user_id: {_eq: $user}}, order_by: {updated_at: desc}) { \
                id name description books_count } }",
        variables: json!({ "user": user_id }),
    }
}

pub fn list_books(list_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "ListBooks",
        query: "query ListBooks($list: Int!) { \
                list_books(where: {list_id: {_eq: $list}}, order_by: {position: asc}) { \
                id book_id book { id title contributions { author { name } } } } }",
        variables: json!({ "list": list_id }),
    }
}

pub fn status_counts(user_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "StatusCounts",
        query: "query StatusCounts($user: Int!) { \
                status_counts: user_book_status_counts(where: {user_id: {_eq: $user}}) { status_id count } \
                goals(where: {user_id: {_eq: $user}}, order_by: {start_date: desc}, limit: 5) { \
                goal progress start_date } }",
        variables: json!({ "user": user_id }),
    }
}

pub fn update_status(user_book_id: i64, status_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "UpdateStatus",
        query: "mutation UpdateStatus($id: Int!, $status: Int!) { \
                update_user_book(id: $id, object: {status_id: $status}) { id } }",
        variables: json!({ "id": user_book_id, "status": status_id }),
    }
}

pub fn update_rating(user_book_id: i64, rating: f64) -> GqlRequest {
    GqlRequest {
        operation: "UpdateRating",
        query: "mutation UpdateRating($id: Int!, $rating: numeric) { \
                update_user_book(id: $id, object: {rating: $rating}) { id } }",
        variables: json!({ "id": user_book_id, "rating": rating }),
    }
}

pub fn insert_user_book(book_id: i64, status_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "InsertUserBook",
        query: "mutation InsertUserBook($book: Int!, $status: Int!) { \
                insert_user_book(object: {book_id: $book, status_id: $status}) { \
                user_book { id book_id status_id rating book { id title } } } }",
        variables: json!({ "book": book_id, "status": status_id }),
    }
}

pub fn delete_list(list_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "DeleteList",
        query: "mutation DeleteList($id: Int!) { delete_list(id: $id) { success } }",
        variables: json!({ "id": list_id }),
    }
}

pub fn update_review(user_book_id: i64, review: &str) -> GqlRequest {
    GqlRequest {
        operation: "UpdateReview",
        query: "mutation UpdateReview($id: Int!, $review: String!) { \
                update_user_book(id: $id, object: {review_raw: $review, review_has_spoilers: false}) { id } }",
        variables: json!({ "id": user_book_id, "review": review }),
    }
}

pub fn update_progress(read_id: i64, pages: i64) -> GqlRequest {
    GqlRequest {
        operation: "UpdateProgress",
        query: "mutation UpdateProgress($id: Int!, $pages: Int!) { \
                update_user_book_read(id: $id, object: {progress_pages: $pages}) { id } }",
        variables: json!({ "id": read_id, "pages": pages }),
    }
}

pub fn delete_journal(journal_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "DeleteJournal",
        query: "mutation DeleteJournal($id: Int!) { delete_reading_journal(id: $id) { id } }",
        variables: json!({ "id": journal_id }),
    }
}

/// Appends `book_id` to a list at position 0.
pub fn insert_list_book(list_id: i64, book_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "InsertListBook",
        query: "mutation InsertListBook($list: Int!, $book: Int!) { \
                insert_list_book(object: {list_id: $list, book_id: $book, position: 0}) { id } }",
        variables: json!({ "list": list_id, "book": book_id }),
    }
}

/// Removes one membership row (see [`ListBook::id`](super::ListBook)).
pub fn delete_list_book(list_book_id: i64) -> GqlRequest {
    GqlRequest {
        operation: "DeleteListBook",
        query: "mutation DeleteListBook($id: Int!) { delete_list_book(id: $id) { id } }",
        variables: json!({ "id": list_book_id }),
    }
}
